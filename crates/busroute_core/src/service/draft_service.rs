//! Draft lifecycle use-case service.
//!
//! # Responsibility
//! - Promote a draft route into a standalone published route.
//! - Retire drafts, either after publish or through explicit deletion.
//!
//! # Invariants
//! - Only routes with `is_draft = true` are published or deleted here.
//! - Published copies keep the draft's `stop_order` and `pickup_time` exactly.
//! - Each operation commits all of its writes or none of them.

use super::error::ServiceResult;
use super::guard::{require_draft, require_text};
use crate::model::route::{Route, RouteId, RouteStop, RouteStopId};
use crate::repo::route_repo::RouteStore;
use log::{info, warn};
use std::time::Instant;

/// Options for [`DraftService::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Label for the published route. Blank or `None` derives it from the
    /// draft label with the draft marker removed.
    pub route_number: Option<String>,
    /// Remove the draft and its route stops once the copy is written.
    pub delete_draft_after: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            route_number: None,
            delete_draft_after: true,
        }
    }
}

/// Draft lifecycle facade over a route store.
pub struct DraftService<S: RouteStore> {
    store: S,
}

impl<S: RouteStore> DraftService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Publishes a draft as a new non-draft route and returns it.
    ///
    /// # Errors
    /// - `RouteNotFound` when the draft does not exist.
    /// - `NotADraft` when the route is already published.
    /// - `BlankField` when no usable label remains after stripping the marker.
    pub fn publish(
        &self,
        draft_route_id: RouteId,
        options: &PublishOptions,
    ) -> ServiceResult<Route> {
        let started_at = Instant::now();
        let result = self
            .store
            .atomically(|store| publish_draft(store, draft_route_id, options));

        match &result {
            Ok((published, stop_count)) => info!(
                "event=draft_publish module=service status=ok draft_route_id={} route_id={} stop_count={} draft_deleted={} duration_ms={}",
                draft_route_id,
                published.id,
                stop_count,
                options.delete_draft_after,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=draft_publish module=service status=error draft_route_id={} duration_ms={} error={}",
                draft_route_id,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result.map(|(published, _)| published)
    }

    /// Deletes a draft route and all of its route stops.
    ///
    /// Published routes are rejected with `NotADraft`; they go through the
    /// general route deletion path instead.
    pub fn delete_draft(&self, route_id: RouteId) -> ServiceResult<()> {
        let result = self.store.atomically(|store| -> ServiceResult<usize> {
            require_draft(store, route_id)?;
            retire_route(store, route_id)
        });

        match &result {
            Ok(removed) => info!(
                "event=draft_delete module=service status=ok route_id={route_id} route_stops_removed={removed}"
            ),
            Err(err) => warn!(
                "event=draft_delete module=service status=error route_id={route_id} error={err}"
            ),
        }
        result.map(|_| ())
    }
}

fn publish_draft<S: RouteStore>(
    store: &S,
    draft_route_id: RouteId,
    options: &PublishOptions,
) -> ServiceResult<(Route, usize)> {
    let draft = require_draft(store, draft_route_id)?;
    let route_number = match options.route_number.as_deref() {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => require_text(&draft.undrafted_route_number(), "route_number")?,
    };

    let published = Route::published_from(&draft, route_number);
    store.save_route(&published)?;

    let draft_stops = store.find_route_stops_by_route_ordered(draft.id)?;
    for draft_stop in &draft_stops {
        store.save_route_stop(&RouteStop::new(
            published.id,
            draft_stop.stop_id,
            draft_stop.stop_order,
            draft_stop.pickup_time.clone(),
        ))?;
    }

    if options.delete_draft_after {
        retire_route(store, draft.id)?;
    }

    Ok((published, draft_stops.len()))
}

/// Deletes a route's stops, then the route. Returns the stop count removed.
pub(crate) fn retire_route<S: RouteStore>(store: &S, route_id: RouteId) -> ServiceResult<usize> {
    let stop_ids: Vec<RouteStopId> = store
        .find_route_stops_by_route_ordered(route_id)?
        .into_iter()
        .map(|route_stop| route_stop.id)
        .collect();
    let removed = store.delete_route_stops(&stop_ids)?;
    store.delete_route(route_id)?;
    Ok(removed)
}
