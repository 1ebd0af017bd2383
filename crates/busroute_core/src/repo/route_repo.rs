//! Route entity store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide id-based access to routes, stops and route-stop associations.
//! - Keep SQL details and row decoding inside the persistence boundary.
//! - Offer a transaction scope so services can make multi-write operations
//!   all-or-nothing.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Route-stop listings for one route are ordered by `stop_order ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::route::{Route, RouteId, RouteStop, RouteStopId};
use crate::model::stop::{Stop, StopId};
use crate::model::ModelValidationError;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ROUTE_SELECT_SQL: &str = "SELECT
    route_uuid,
    route_number,
    is_draft,
    source_route_uuid
FROM routes";

const STOP_SELECT_SQL: &str = "SELECT
    stop_uuid,
    name,
    latitude,
    longitude
FROM stops";

const ROUTE_STOP_SELECT_SQL: &str = "SELECT
    route_stop_uuid,
    route_uuid,
    stop_uuid,
    stop_order,
    pickup_time
FROM route_stops";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from route store persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation before write or after read.
    Validation(ModelValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Delete target route does not exist.
    RouteNotFound(RouteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "route store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "route store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "route store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted route data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable entity store for routes, stops and route stops.
///
/// Services depend on this trait only; the SQLite implementation below is the
/// production backend.
pub trait RouteStore {
    fn find_route_by_id(&self, id: RouteId) -> RepoResult<Option<Route>>;
    fn find_stop_by_id(&self, id: StopId) -> RepoResult<Option<Stop>>;
    /// Lists one route's stops by `stop_order ASC`.
    fn find_route_stops_by_route_ordered(&self, route_id: RouteId) -> RepoResult<Vec<RouteStop>>;
    /// Loads route stops for `ids`, in the order of `ids`. Unknown ids are
    /// skipped, so callers compare lengths to detect them.
    fn find_route_stops_by_ids(&self, ids: &[RouteStopId]) -> RepoResult<Vec<RouteStop>>;
    /// Lists routes by `route_number ASC, route_uuid ASC`.
    fn list_routes(&self, include_drafts: bool) -> RepoResult<Vec<Route>>;
    /// Returns `max(stop_order) + 1` for the route, or 1 when it has no stops.
    fn next_stop_order(&self, route_id: RouteId) -> RepoResult<u32>;
    fn save_route(&self, route: &Route) -> RepoResult<()>;
    fn save_stop(&self, stop: &Stop) -> RepoResult<()>;
    fn save_route_stop(&self, route_stop: &RouteStop) -> RepoResult<()>;
    /// Deletes one route. Its remaining route stops cascade.
    fn delete_route(&self, id: RouteId) -> RepoResult<()>;
    /// Deletes route stops by id and returns how many rows were removed.
    fn delete_route_stops(&self, ids: &[RouteStopId]) -> RepoResult<usize>;

    /// Runs `work` inside one store transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back otherwise. When a
    /// transaction is already open on the underlying connection, `work` joins
    /// it instead of opening a nested one.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>;
}

/// SQLite-backed route store.
pub struct SqliteRouteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRouteStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_route_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RouteStore for SqliteRouteStore<'_> {
    fn find_route_by_id(&self, id: RouteId) -> RepoResult<Option<Route>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROUTE_SELECT_SQL} WHERE route_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_route_row(row)?));
        }
        Ok(None)
    }

    fn find_stop_by_id(&self, id: StopId) -> RepoResult<Option<Stop>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STOP_SELECT_SQL} WHERE stop_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_stop_row(row)?));
        }
        Ok(None)
    }

    fn find_route_stops_by_route_ordered(&self, route_id: RouteId) -> RepoResult<Vec<RouteStop>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROUTE_STOP_SELECT_SQL}
             WHERE route_uuid = ?1
             ORDER BY stop_order ASC, route_stop_uuid ASC;"
        ))?;
        let mut rows = stmt.query([route_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_route_stop_row(row)?);
        }
        Ok(items)
    }

    fn find_route_stops_by_ids(&self, ids: &[RouteStopId]) -> RepoResult<Vec<RouteStop>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{ROUTE_STOP_SELECT_SQL} WHERE route_stop_uuid IN ({});",
            placeholders(ids.len())
        );
        let bind_values = ids.iter().map(|id| Value::Text(id.to_string()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut by_id = HashMap::new();
        while let Some(row) = rows.next()? {
            let route_stop = parse_route_stop_row(row)?;
            by_id.insert(route_stop.id, route_stop);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    fn list_routes(&self, include_drafts: bool) -> RepoResult<Vec<Route>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROUTE_SELECT_SQL}
             WHERE (?1 = 1 OR is_draft = 0)
             ORDER BY route_number ASC, route_uuid ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(include_drafts)])?;
        let mut routes = Vec::new();
        while let Some(row) = rows.next()? {
            routes.push(parse_route_row(row)?);
        }
        Ok(routes)
    }

    fn next_stop_order(&self, route_id: RouteId) -> RepoResult<u32> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(stop_order), 0) + 1
             FROM route_stops
             WHERE route_uuid = ?1;",
            [route_id.to_string()],
            |row| row.get(0),
        )?;
        u32::try_from(next).map_err(|_| {
            RepoError::InvalidData(format!("stop_order overflow for route {route_id}"))
        })
    }

    fn save_route(&self, route: &Route) -> RepoResult<()> {
        route.validate()?;

        self.conn.execute(
            "INSERT INTO routes (
                route_uuid,
                route_number,
                is_draft,
                source_route_uuid
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                route.id.to_string(),
                route.route_number.as_str(),
                bool_to_int(route.is_draft),
                route.source_route_id.map(|value| value.to_string()),
            ],
        )?;
        Ok(())
    }

    fn save_stop(&self, stop: &Stop) -> RepoResult<()> {
        stop.validate()?;

        self.conn.execute(
            "INSERT INTO stops (
                stop_uuid,
                name,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                stop.id.to_string(),
                stop.name.as_str(),
                stop.latitude,
                stop.longitude,
            ],
        )?;
        Ok(())
    }

    fn save_route_stop(&self, route_stop: &RouteStop) -> RepoResult<()> {
        route_stop.validate()?;

        self.conn.execute(
            "INSERT INTO route_stops (
                route_stop_uuid,
                route_uuid,
                stop_uuid,
                stop_order,
                pickup_time
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                route_stop.id.to_string(),
                route_stop.route_id.to_string(),
                route_stop.stop_id.to_string(),
                i64::from(route_stop.stop_order),
                route_stop.pickup_time.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn delete_route(&self, id: RouteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM routes WHERE route_uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::RouteNotFound(id));
        }
        Ok(())
    }

    fn delete_route_stops(&self, ids: &[RouteStopId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM route_stops WHERE route_stop_uuid IN ({});",
            placeholders(ids.len())
        );
        let bind_values = ids.iter().map(|id| Value::Text(id.to_string()));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        if !self.conn.is_autocommit() {
            return work(self);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls back every write made by `work`.
        let output = work(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(output)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn parse_route_row(row: &Row<'_>) -> RepoResult<Route> {
    let route_uuid: String = row.get("route_uuid")?;
    let source_route_id = row
        .get::<_, Option<String>>("source_route_uuid")?
        .map(|value| parse_uuid(&value, "routes.source_route_uuid"))
        .transpose()?;

    let route = Route {
        id: parse_uuid(&route_uuid, "routes.route_uuid")?,
        route_number: row.get("route_number")?,
        is_draft: parse_bool(row.get("is_draft")?, "routes.is_draft")?,
        source_route_id,
    };
    route.validate()?;
    Ok(route)
}

fn parse_stop_row(row: &Row<'_>) -> RepoResult<Stop> {
    let stop_uuid: String = row.get("stop_uuid")?;
    let stop = Stop {
        id: parse_uuid(&stop_uuid, "stops.stop_uuid")?,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
    };
    stop.validate()?;
    Ok(stop)
}

fn parse_route_stop_row(row: &Row<'_>) -> RepoResult<RouteStop> {
    let route_stop_uuid: String = row.get("route_stop_uuid")?;
    let route_uuid: String = row.get("route_uuid")?;
    let stop_uuid: String = row.get("stop_uuid")?;
    let stop_order_raw: i64 = row.get("stop_order")?;
    let stop_order = u32::try_from(stop_order_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid stop_order `{stop_order_raw}` in route_stops.stop_order"
        ))
    })?;

    let route_stop = RouteStop {
        id: parse_uuid(&route_stop_uuid, "route_stops.route_stop_uuid")?,
        route_id: parse_uuid(&route_uuid, "route_stops.route_uuid")?,
        stop_id: parse_uuid(&stop_uuid, "route_stops.stop_uuid")?,
        stop_order,
        pickup_time: row.get("pickup_time")?,
    };
    route_stop.validate()?;
    Ok(route_stop)
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "routes",
        &["route_uuid", "route_number", "is_draft", "source_route_uuid"],
    ),
    ("stops", &["stop_uuid", "name", "latitude", "longitude"]),
    (
        "route_stops",
        &[
            "route_stop_uuid",
            "route_uuid",
            "stop_uuid",
            "stop_order",
            "pickup_time",
        ],
    ),
];

fn ensure_route_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
