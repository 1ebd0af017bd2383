//! Route catalog use-case service.
//!
//! # Responsibility
//! - Create routes and stops and attach stops to routes.
//! - Provide list and detail read models for callers.
//! - Offer the general route deletion path (drafts and published alike).
//!
//! # Invariants
//! - Attached stops are appended at `max(stop_order) + 1`, so a route built
//!   only through this service keeps a dense `1..N` sequence.
//! - `pickup_time` is checked for presence only, never for format.

use super::draft_service::retire_route;
use super::error::ServiceResult;
use super::guard::{require_route, require_stop, require_text};
use crate::model::route::{Route, RouteId, RouteStop, RouteStopId};
use crate::model::stop::{Stop, StopId};
use crate::repo::route_repo::RouteStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One stop on a route, joined with its stop record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOnRoute {
    pub route_stop_id: RouteStopId,
    pub stop_order: u32,
    pub stop_id: StopId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pickup_time: Option<String>,
}

/// Route detail read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub route: Route,
    /// Sorted by `stop_order ASC`.
    pub stops: Vec<StopOnRoute>,
}

/// Catalog facade over a route store.
pub struct RouteService<S: RouteStore> {
    store: S,
}

impl<S: RouteStore> RouteService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a published route without lineage.
    pub fn create_route(&self, route_number: &str) -> ServiceResult<Route> {
        let route = Route::new(require_text(route_number, "route_number")?);
        self.store.save_route(&route)?;
        Ok(route)
    }

    pub fn create_stop(&self, name: &str, latitude: f64, longitude: f64) -> ServiceResult<Stop> {
        let stop = Stop::new(require_text(name, "name")?, latitude, longitude);
        self.store.save_stop(&stop)?;
        Ok(stop)
    }

    /// Appends `stop_id` to the end of `route_id`.
    ///
    /// # Errors
    /// - `BlankField("pickup_time")` when the pickup time is blank.
    /// - `RouteNotFound` / `StopNotFound` for unknown ids.
    pub fn attach_stop(
        &self,
        route_id: RouteId,
        stop_id: StopId,
        pickup_time: &str,
    ) -> ServiceResult<RouteStop> {
        let pickup_time = require_text(pickup_time, "pickup_time")?;
        self.store.atomically(|store| -> ServiceResult<RouteStop> {
            require_route(store, route_id)?;
            require_stop(store, stop_id)?;

            let stop_order = store.next_stop_order(route_id)?;
            let route_stop = RouteStop::new(route_id, stop_id, stop_order, Some(pickup_time));
            store.save_route_stop(&route_stop)?;
            Ok(route_stop)
        })
    }

    /// Lists routes. Drafts are hidden unless `include_drafts` is set.
    pub fn list_routes(&self, include_drafts: bool) -> ServiceResult<Vec<Route>> {
        self.store.list_routes(include_drafts).map_err(Into::into)
    }

    /// Loads one route with its stops in traversal order.
    pub fn route_details(&self, route_id: RouteId) -> ServiceResult<RouteDetails> {
        let route = require_route(&self.store, route_id)?;
        let stops = self
            .store
            .find_route_stops_by_route_ordered(route_id)?
            .into_iter()
            .map(|route_stop| -> ServiceResult<StopOnRoute> {
                let stop = require_stop(&self.store, route_stop.stop_id)?;
                Ok(StopOnRoute {
                    route_stop_id: route_stop.id,
                    stop_order: route_stop.stop_order,
                    stop_id: stop.id,
                    name: stop.name,
                    latitude: stop.latitude,
                    longitude: stop.longitude,
                    pickup_time: route_stop.pickup_time,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(RouteDetails { route, stops })
    }

    /// Deletes any route, draft or published, with its route stops.
    pub fn delete_route(&self, route_id: RouteId) -> ServiceResult<()> {
        let result = self
            .store
            .atomically(|store| retire_route(store, route_id));

        match &result {
            Ok(removed) => info!(
                "event=route_delete module=service status=ok route_id={route_id} route_stops_removed={removed}"
            ),
            Err(err) => warn!(
                "event=route_delete module=service status=error route_id={route_id} error={err}"
            ),
        }
        result.map(|_| ())
    }
}
