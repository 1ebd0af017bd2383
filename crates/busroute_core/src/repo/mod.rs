//! Repository layer: the route entity store.
//!
//! # Responsibility
//! - Define the id-based data access contract used by route services.
//! - Isolate SQLite query details from merge/publish orchestration.
//!
//! # Invariants
//! - Store writes enforce model `validate()` before persistence.
//! - Lookups return `Option` for absent records; services decide whether
//!   absence is an error.

pub mod route_repo;
