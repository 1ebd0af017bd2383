//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `busroute_core` linkage and print a deterministic probe.
//! - When `BUSROUTE_DB_PATH` is set, open the store and list published routes.

use busroute_core::db::open_db;
use busroute_core::{init_logging_from_config, CoreConfig, RouteService, SqliteRouteStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("busroute_core ping={}", busroute_core::ping());
    println!("busroute_core version={}", busroute_core::core_version());

    match run(&CoreConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    if init_logging_from_config(config)? {
        log::info!("event=cli_start module=cli status=ok");
    }

    let Some(db_path) = config.db_path.as_deref() else {
        return Ok(());
    };

    let conn = open_db(db_path)?;
    let service = RouteService::new(SqliteRouteStore::try_new(&conn)?);
    for route in service.list_routes(false)? {
        let details = service.route_details(route.id)?;
        println!(
            "route id={} number={} stops={}",
            route.id,
            route.route_number,
            details.stops.len()
        );
    }
    Ok(())
}
