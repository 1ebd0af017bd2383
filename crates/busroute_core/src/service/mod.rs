//! Route use-case services.
//!
//! # Responsibility
//! - Orchestrate route store calls into merge, publish and catalog APIs.
//! - Validate every precondition before the first write of an operation.
//!
//! # Invariants
//! - Services never bypass store validation/persistence contracts.
//! - Multi-write operations run inside `RouteStore::atomically`.

pub mod draft_service;
pub mod error;
mod guard;
pub mod merge_service;
pub mod proximity;
pub mod route_service;
