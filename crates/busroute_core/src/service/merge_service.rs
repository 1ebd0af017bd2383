//! Route merge use-case service.
//!
//! # Responsibility
//! - Combine a base route's stops with a selection of donor route stops.
//! - Sequence the combined set and persist it as a new draft route.
//!
//! # Invariants
//! - Base and donor routes and their route stops are never modified.
//! - A stop appears at most once in the draft; base entries win.
//! - Only base-route pickup times survive into the draft.
//! - Draft `stop_order` values are exactly `1..N`.
//! - Any rejected precondition leaves the store unchanged.

use super::error::{RouteServiceError, ServiceResult};
use super::guard::{require_route, require_stop};
use super::proximity::order_by_proximity;
use crate::model::route::{Route, RouteId, RouteStop, RouteStopId};
use crate::model::stop::{Stop, StopId};
use crate::repo::route_repo::RouteStore;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

/// How the combined stop list is sequenced in the draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Greedy nearest-neighbour order anchored at the first combined stop.
    #[default]
    Proximity,
    /// Base order followed by surviving donor stops in selection order.
    Append,
}

impl MergeStrategy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Proximity => "proximity",
            Self::Append => "append",
        }
    }
}

impl Display for MergeStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = RouteServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "proximity" => Ok(Self::Proximity),
            "append" => Ok(Self::Append),
            _ => Err(RouteServiceError::UnknownStrategy(value.to_string())),
        }
    }
}

/// Input of [`RouteMergeService::merge_into_draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Route whose stops form the starting point.
    pub base_route_id: RouteId,
    /// Route supplying the selected stops.
    pub donor_route_id: RouteId,
    /// Route-stop ids on the donor route, in selection order.
    pub route_stop_ids: Vec<RouteStopId>,
    pub strategy: MergeStrategy,
}

impl MergeRequest {
    /// Creates a request using the default proximity strategy.
    pub fn new(
        base_route_id: RouteId,
        donor_route_id: RouteId,
        route_stop_ids: Vec<RouteStopId>,
    ) -> Self {
        Self {
            base_route_id,
            donor_route_id,
            route_stop_ids,
            strategy: MergeStrategy::default(),
        }
    }
}

struct MergeSummary {
    draft: Route,
    stop_count: usize,
    donor_added: usize,
    donor_skipped: usize,
}

/// Merge service facade over a route store.
pub struct RouteMergeService<S: RouteStore> {
    store: S,
}

impl<S: RouteStore> RouteMergeService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Builds a new draft route from the base route plus selected donor stops.
    ///
    /// # Errors
    /// - `SameBaseAndDonor`, `EmptySelection` for malformed requests.
    /// - `RouteNotFound` when the base or donor route is missing.
    /// - `RouteStopNotFound` when a selected id does not exist.
    /// - `ForeignRouteStop` when a selected route stop is not on the donor.
    ///
    /// All checks run before the first write; the draft and its route stops
    /// are written in one transaction.
    pub fn merge_into_draft(&self, request: &MergeRequest) -> ServiceResult<Route> {
        let started_at = Instant::now();
        let result = validate_request(request).and_then(|selection| {
            self.store.atomically(|store| build_draft(store, request, &selection))
        });

        match result {
            Ok(summary) => {
                info!(
                    "event=route_merge module=service status=ok base_route_id={} donor_route_id={} draft_route_id={} strategy={} stop_count={} donor_added={} donor_skipped={} duration_ms={}",
                    request.base_route_id,
                    request.donor_route_id,
                    summary.draft.id,
                    request.strategy,
                    summary.stop_count,
                    summary.donor_added,
                    summary.donor_skipped,
                    started_at.elapsed().as_millis()
                );
                Ok(summary.draft)
            }
            Err(err) => {
                warn!(
                    "event=route_merge module=service status=error base_route_id={} donor_route_id={} duration_ms={} error={}",
                    request.base_route_id,
                    request.donor_route_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Checks request shape and returns the selection with repeats removed.
fn validate_request(request: &MergeRequest) -> ServiceResult<Vec<RouteStopId>> {
    if request.base_route_id == request.donor_route_id {
        return Err(RouteServiceError::SameBaseAndDonor(request.base_route_id));
    }
    if request.route_stop_ids.is_empty() {
        return Err(RouteServiceError::EmptySelection);
    }

    let mut seen = HashSet::new();
    Ok(request
        .route_stop_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect())
}

fn build_draft<S: RouteStore>(
    store: &S,
    request: &MergeRequest,
    selection: &[RouteStopId],
) -> ServiceResult<MergeSummary> {
    let base = require_route(store, request.base_route_id)?;
    require_route(store, request.donor_route_id)?;

    let base_stops = store.find_route_stops_by_route_ordered(base.id)?;
    let donor_selected = load_donor_selection(store, request.donor_route_id, selection)?;

    let mut seen: HashSet<StopId> = HashSet::new();
    let mut base_pickups: HashMap<StopId, Option<String>> = HashMap::new();
    let mut combined_ids = Vec::with_capacity(base_stops.len() + donor_selected.len());
    for route_stop in &base_stops {
        if seen.insert(route_stop.stop_id) {
            combined_ids.push(route_stop.stop_id);
            base_pickups.insert(route_stop.stop_id, route_stop.pickup_time.clone());
        }
    }

    let mut donor_added = 0;
    for route_stop in &donor_selected {
        if seen.insert(route_stop.stop_id) {
            combined_ids.push(route_stop.stop_id);
            donor_added += 1;
        }
    }

    let combined = combined_ids
        .into_iter()
        .map(|stop_id| require_stop(store, stop_id))
        .collect::<ServiceResult<Vec<Stop>>>()?;

    let ordered = match request.strategy {
        MergeStrategy::Proximity => order_by_proximity(&combined),
        MergeStrategy::Append => combined,
    };

    let draft = Route::draft_of(&base);
    store.save_route(&draft)?;
    for (stop_order, stop) in (1u32..).zip(ordered.iter()) {
        let pickup_time = base_pickups.get(&stop.id).cloned().flatten();
        store.save_route_stop(&RouteStop::new(draft.id, stop.id, stop_order, pickup_time))?;
    }

    Ok(MergeSummary {
        draft,
        stop_count: ordered.len(),
        donor_added,
        donor_skipped: donor_selected.len() - donor_added,
    })
}

/// Loads selected route stops in selection order and checks donor ownership.
fn load_donor_selection<S: RouteStore>(
    store: &S,
    donor_route_id: RouteId,
    selection: &[RouteStopId],
) -> ServiceResult<Vec<RouteStop>> {
    let loaded = store.find_route_stops_by_ids(selection)?;
    if loaded.len() != selection.len() {
        let found: HashSet<RouteStopId> = loaded.iter().map(|route_stop| route_stop.id).collect();
        if let Some(missing) = selection.iter().find(|id| !found.contains(*id)) {
            return Err(RouteServiceError::RouteStopNotFound(*missing));
        }
    }

    if let Some(foreign) = loaded
        .iter()
        .find(|route_stop| route_stop.route_id != donor_route_id)
    {
        return Err(RouteServiceError::ForeignRouteStop {
            route_stop_id: foreign.id,
            donor_route_id,
            owner_route_id: foreign.route_id,
        });
    }

    Ok(loaded)
}
