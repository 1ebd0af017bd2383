//! Route and route-stop domain models.
//!
//! # Responsibility
//! - Define the labeled route record and its draft/lineage flags.
//! - Define the join record binding one stop to one route at one position.
//!
//! # Invariants
//! - `source_route_id` has no behavioral effect on published routes.
//! - `stop_order` is 1-based; services always write a dense `1..N` sequence.

use super::stop::StopId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a route.
pub type RouteId = Uuid;

/// Stable identifier of a route-stop association.
pub type RouteStopId = Uuid;

/// Marker appended to a base route number when a merge creates a draft.
pub const DRAFT_SUFFIX: &str = "-DRAFT";

/// Labeled, ordered sequence of stops. May be a draft or a published route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    /// Human-readable route number/label.
    pub route_number: String,
    pub is_draft: bool,
    /// Route this one was derived from. Kept for audit after publish.
    pub source_route_id: Option<RouteId>,
}

impl Route {
    /// Creates a published (non-draft) route without lineage.
    pub fn new(route_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_number: route_number.into(),
            is_draft: false,
            source_route_id: None,
        }
    }

    /// Creates a draft derived from `base`, labeled `<base>-DRAFT`.
    pub fn draft_of(base: &Route) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_number: format!("{}{DRAFT_SUFFIX}", base.route_number),
            is_draft: true,
            source_route_id: Some(base.id),
        }
    }

    /// Creates the published copy of `draft`, keeping its lineage.
    pub fn published_from(draft: &Route, route_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_number: route_number.into(),
            is_draft: false,
            source_route_id: draft.source_route_id,
        }
    }

    /// Route number with every draft marker removed.
    pub fn undrafted_route_number(&self) -> String {
        self.route_number.replace(DRAFT_SUFFIX, "")
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId("route.id"));
        }
        if self.route_number.trim().is_empty() {
            return Err(ModelValidationError::BlankField("route.route_number"));
        }
        Ok(())
    }
}

/// Binds one stop to one route at a specific position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub id: RouteStopId,
    /// Owning route.
    pub route_id: RouteId,
    /// Referenced stop. Not owned.
    pub stop_id: StopId,
    /// 1-based traversal position, unique within `route_id`.
    pub stop_order: u32,
    /// Free-form "HH:MM"-like value. Not semantically validated.
    pub pickup_time: Option<String>,
}

impl RouteStop {
    /// Creates a route-stop association with a freshly generated id.
    pub fn new(
        route_id: RouteId,
        stop_id: StopId,
        stop_order: u32,
        pickup_time: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_id,
            stop_id,
            stop_order,
            pickup_time,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId("route_stop.id"));
        }
        if self.route_id.is_nil() {
            return Err(ModelValidationError::NilId("route_stop.route_id"));
        }
        if self.stop_id.is_nil() {
            return Err(ModelValidationError::NilId("route_stop.stop_id"));
        }
        if self.stop_order == 0 {
            return Err(ModelValidationError::NonPositiveStopOrder(self.stop_order));
        }
        Ok(())
    }
}
