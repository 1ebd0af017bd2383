//! Core domain logic for bus route merging, drafts and publishing.
//! This crate is the single source of truth for route invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::route::{Route, RouteId, RouteStop, RouteStopId, DRAFT_SUFFIX};
pub use model::stop::{Stop, StopId};
pub use model::ModelValidationError;
pub use repo::route_repo::{RepoError, RepoResult, RouteStore, SqliteRouteStore};
pub use service::draft_service::{DraftService, PublishOptions};
pub use service::error::{ErrorKind, RouteServiceError, ServiceResult};
pub use service::merge_service::{MergeRequest, MergeStrategy, RouteMergeService};
pub use service::proximity::order_by_proximity;
pub use service::route_service::{RouteDetails, RouteService, StopOnRoute};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
