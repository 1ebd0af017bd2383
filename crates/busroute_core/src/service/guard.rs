//! Lookup and input guards shared by route services.
//!
//! Each guard turns an absent record or blank input into the matching
//! `RouteServiceError` so services can validate before writing anything.

use super::error::{RouteServiceError, ServiceResult};
use crate::model::route::{Route, RouteId};
use crate::model::stop::{Stop, StopId};
use crate::repo::route_repo::RouteStore;

pub(crate) fn require_route<S: RouteStore>(store: &S, id: RouteId) -> ServiceResult<Route> {
    store
        .find_route_by_id(id)?
        .ok_or(RouteServiceError::RouteNotFound(id))
}

pub(crate) fn require_stop<S: RouteStore>(store: &S, id: StopId) -> ServiceResult<Stop> {
    store
        .find_stop_by_id(id)?
        .ok_or(RouteServiceError::StopNotFound(id))
}

/// Loads a route and rejects it unless it is a draft.
pub(crate) fn require_draft<S: RouteStore>(store: &S, id: RouteId) -> ServiceResult<Route> {
    let route = require_route(store, id)?;
    if !route.is_draft {
        return Err(RouteServiceError::NotADraft(id));
    }
    Ok(route)
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(value: &str, field: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RouteServiceError::BlankField(field));
    }
    Ok(trimmed.to_string())
}
