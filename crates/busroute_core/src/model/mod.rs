//! Domain model for routes, stops and their ordered associations.
//!
//! # Responsibility
//! - Define canonical records used by merge, publish and catalog services.
//! - Provide write-path validation shared by every store implementation.
//!
//! # Invariants
//! - Entities reference each other by id only, never by embedded value.
//! - `RouteStop` is the sole owner of ordering and pickup-time data.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod route;
pub mod stop;

/// Validation failures raised before a record is persisted or after it is read.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Identifier is the nil UUID.
    NilId(&'static str),
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Coordinate is NaN or infinite.
    NonFiniteCoordinate { field: &'static str, value: f64 },
    /// `stop_order` must start at 1.
    NonPositiveStopOrder(u32),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(field) => write!(f, "{field} must not be the nil uuid"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NonFiniteCoordinate { field, value } => {
                write!(f, "{field} must be a finite number, got {value}")
            }
            Self::NonPositiveStopOrder(value) => {
                write!(f, "stop_order must be >= 1, got {value}")
            }
        }
    }
}

impl Error for ModelValidationError {}
