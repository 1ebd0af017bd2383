#![allow(dead_code)]

use busroute_core::db::open_db_in_memory;
use busroute_core::{
    RepoError, RepoResult, Route, RouteId, RouteService, RouteStop, RouteStopId, RouteStore,
    SqliteRouteStore, Stop, StopId,
};
use rusqlite::Connection;
use std::cell::Cell;

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn store(conn: &Connection) -> SqliteRouteStore<'_> {
    SqliteRouteStore::try_new(conn).unwrap()
}

pub fn catalog(conn: &Connection) -> RouteService<SqliteRouteStore<'_>> {
    RouteService::new(store(conn))
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

/// Two-route layout used across merge and publish tests.
///
/// Base route "10": A(0,0) at 08:00, B(1,0) at 08:05.
/// Donor route "20": C(0.5,0.1) at 09:00.
pub struct TwoRoutes {
    pub base: Route,
    pub donor: Route,
    pub a: Stop,
    pub b: Stop,
    pub c: Stop,
    pub donor_c: RouteStop,
}

pub fn seed_two_routes(conn: &Connection) -> TwoRoutes {
    let catalog = catalog(conn);
    let base = catalog.create_route("10").unwrap();
    let donor = catalog.create_route("20").unwrap();

    let a = catalog.create_stop("A", 0.0, 0.0).unwrap();
    let b = catalog.create_stop("B", 1.0, 0.0).unwrap();
    let c = catalog.create_stop("C", 0.5, 0.1).unwrap();

    catalog.attach_stop(base.id, a.id, "08:00").unwrap();
    catalog.attach_stop(base.id, b.id, "08:05").unwrap();
    let donor_c = catalog.attach_stop(donor.id, c.id, "09:00").unwrap();

    TwoRoutes {
        base,
        donor,
        a,
        b,
        c,
        donor_c,
    }
}

/// Asserts `stop_order` values of a route are exactly `1..=N`.
pub fn assert_dense(route_stops: &[RouteStop]) {
    let orders: Vec<u32> = route_stops.iter().map(|rs| rs.stop_order).collect();
    let expected: Vec<u32> = (1..=route_stops.len() as u32).collect();
    assert_eq!(orders, expected);
}

/// Store wrapper that fails `save_route_stop` after a number of successes.
pub struct FailingStore<'conn> {
    inner: SqliteRouteStore<'conn>,
    route_stop_saves_left: Cell<usize>,
}

impl<'conn> FailingStore<'conn> {
    pub fn new(conn: &'conn Connection, route_stop_saves_allowed: usize) -> Self {
        Self {
            inner: store(conn),
            route_stop_saves_left: Cell::new(route_stop_saves_allowed),
        }
    }
}

impl RouteStore for FailingStore<'_> {
    fn find_route_by_id(&self, id: RouteId) -> RepoResult<Option<Route>> {
        self.inner.find_route_by_id(id)
    }

    fn find_stop_by_id(&self, id: StopId) -> RepoResult<Option<Stop>> {
        self.inner.find_stop_by_id(id)
    }

    fn find_route_stops_by_route_ordered(&self, route_id: RouteId) -> RepoResult<Vec<RouteStop>> {
        self.inner.find_route_stops_by_route_ordered(route_id)
    }

    fn find_route_stops_by_ids(&self, ids: &[RouteStopId]) -> RepoResult<Vec<RouteStop>> {
        self.inner.find_route_stops_by_ids(ids)
    }

    fn list_routes(&self, include_drafts: bool) -> RepoResult<Vec<Route>> {
        self.inner.list_routes(include_drafts)
    }

    fn next_stop_order(&self, route_id: RouteId) -> RepoResult<u32> {
        self.inner.next_stop_order(route_id)
    }

    fn save_route(&self, route: &Route) -> RepoResult<()> {
        self.inner.save_route(route)
    }

    fn save_stop(&self, stop: &Stop) -> RepoResult<()> {
        self.inner.save_stop(stop)
    }

    fn save_route_stop(&self, route_stop: &RouteStop) -> RepoResult<()> {
        let left = self.route_stop_saves_left.get();
        if left == 0 {
            return Err(RepoError::InvalidData("injected write failure".to_string()));
        }
        self.route_stop_saves_left.set(left - 1);
        self.inner.save_route_stop(route_stop)
    }

    fn delete_route(&self, id: RouteId) -> RepoResult<()> {
        self.inner.delete_route(id)
    }

    fn delete_route_stops(&self, ids: &[RouteStopId]) -> RepoResult<usize> {
        self.inner.delete_route_stops(ids)
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        self.inner.atomically(|_| work(self))
    }
}
