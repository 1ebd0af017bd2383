mod support;

use busroute_core::{
    DraftService, ErrorKind, MergeRequest, PublishOptions, Route, RouteMergeService,
    RouteServiceError, RouteStore,
};
use rusqlite::Connection;
use support::{
    assert_dense, catalog, count_rows, seed_two_routes, setup, store, FailingStore, TwoRoutes,
};
use uuid::Uuid;

fn merged_draft(conn: &Connection) -> (TwoRoutes, Route) {
    let fx = seed_two_routes(conn);
    let draft = RouteMergeService::new(store(conn))
        .merge_into_draft(&MergeRequest::new(
            fx.base.id,
            fx.donor.id,
            vec![fx.donor_c.id],
        ))
        .unwrap();
    (fx, draft)
}

#[test]
fn publish_copies_stops_and_removes_draft_by_default() {
    let conn = setup();
    let (fx, draft) = merged_draft(&conn);
    let draft_stops = store(&conn)
        .find_route_stops_by_route_ordered(draft.id)
        .unwrap();

    let published = DraftService::new(store(&conn))
        .publish(draft.id, &PublishOptions::default())
        .unwrap();

    assert_eq!(published.route_number, "10");
    assert!(!published.is_draft);
    assert_ne!(published.id, fx.base.id);

    let published_stops = store(&conn)
        .find_route_stops_by_route_ordered(published.id)
        .unwrap();
    let copied: Vec<_> = published_stops
        .iter()
        .map(|rs| (rs.stop_id, rs.stop_order, rs.pickup_time.clone()))
        .collect();
    let original: Vec<_> = draft_stops
        .iter()
        .map(|rs| (rs.stop_id, rs.stop_order, rs.pickup_time.clone()))
        .collect();
    assert_eq!(copied, original);
    assert_dense(&published_stops);

    assert!(store(&conn).find_route_by_id(draft.id).unwrap().is_none());
    assert!(store(&conn)
        .find_route_stops_by_route_ordered(draft.id)
        .unwrap()
        .is_empty());
}

#[test]
fn publish_can_keep_the_draft() {
    let conn = setup();
    let (_, draft) = merged_draft(&conn);
    let options = PublishOptions {
        route_number: None,
        delete_draft_after: false,
    };

    let published = DraftService::new(store(&conn))
        .publish(draft.id, &options)
        .unwrap();

    let reader = store(&conn);
    assert_eq!(reader.find_route_by_id(draft.id).unwrap().unwrap(), draft);
    assert_eq!(
        reader.find_route_stops_by_route_ordered(draft.id).unwrap().len(),
        reader
            .find_route_stops_by_route_ordered(published.id)
            .unwrap()
            .len()
    );
}

#[test]
fn publish_uses_trimmed_override_label_and_ignores_blank_override() {
    let conn = setup();
    let (fx, draft) = merged_draft(&conn);
    let service = DraftService::new(store(&conn));

    let keep = PublishOptions {
        route_number: Some("  10X ".to_string()),
        delete_draft_after: false,
    };
    let custom = service.publish(draft.id, &keep).unwrap();
    assert_eq!(custom.route_number, "10X");

    let blank = PublishOptions {
        route_number: Some("   ".to_string()),
        delete_draft_after: true,
    };
    let derived = service.publish(draft.id, &blank).unwrap();
    assert_eq!(derived.route_number, fx.base.route_number);
}

#[test]
fn published_route_keeps_lineage_and_is_listed() {
    let conn = setup();
    let (fx, draft) = merged_draft(&conn);

    let published = DraftService::new(store(&conn))
        .publish(draft.id, &PublishOptions::default())
        .unwrap();
    assert_eq!(published.source_route_id, Some(fx.base.id));

    let listed: Vec<Uuid> = catalog(&conn)
        .list_routes(false)
        .unwrap()
        .into_iter()
        .map(|route| route.id)
        .collect();
    assert!(listed.contains(&published.id));
    assert!(listed.contains(&fx.base.id));
    assert!(!listed.contains(&draft.id));
}

#[test]
fn publish_rejects_published_route() {
    let conn = setup();
    let fx = seed_two_routes(&conn);

    let err = DraftService::new(store(&conn))
        .publish(fx.base.id, &PublishOptions::default())
        .unwrap_err();

    assert!(matches!(err, RouteServiceError::NotADraft(id) if id == fx.base.id));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(count_rows(&conn, "routes"), 2);
}

#[test]
fn publish_rejects_missing_draft() {
    let conn = setup();
    let missing = Uuid::new_v4();

    let err = DraftService::new(store(&conn))
        .publish(missing, &PublishOptions::default())
        .unwrap_err();

    assert!(matches!(err, RouteServiceError::RouteNotFound(id) if id == missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn publish_rolls_back_when_a_copy_write_fails() {
    let conn = setup();
    let (_, draft) = merged_draft(&conn);
    let routes_before = count_rows(&conn, "routes");
    let route_stops_before = count_rows(&conn, "route_stops");

    let err = DraftService::new(FailingStore::new(&conn, 2))
        .publish(draft.id, &PublishOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(count_rows(&conn, "routes"), routes_before);
    assert_eq!(count_rows(&conn, "route_stops"), route_stops_before);
    assert_eq!(
        store(&conn).find_route_by_id(draft.id).unwrap().unwrap(),
        draft
    );
}

#[test]
fn delete_draft_removes_route_and_its_stops() {
    let conn = setup();
    let (fx, draft) = merged_draft(&conn);

    DraftService::new(store(&conn)).delete_draft(draft.id).unwrap();

    let reader = store(&conn);
    assert!(reader.find_route_by_id(draft.id).unwrap().is_none());
    assert!(reader
        .find_route_stops_by_route_ordered(draft.id)
        .unwrap()
        .is_empty());
    assert_eq!(
        reader
            .find_route_stops_by_route_ordered(fx.base.id)
            .unwrap()
            .len(),
        2
    );
    // Stops themselves are shared records and survive.
    assert_eq!(count_rows(&conn, "stops"), 3);
}

#[test]
fn delete_draft_rejects_published_route_and_leaves_it_intact() {
    let conn = setup();
    let fx = seed_two_routes(&conn);

    let err = DraftService::new(store(&conn))
        .delete_draft(fx.base.id)
        .unwrap_err();

    assert!(matches!(err, RouteServiceError::NotADraft(id) if id == fx.base.id));
    let reader = store(&conn);
    assert_eq!(reader.find_route_by_id(fx.base.id).unwrap().unwrap(), fx.base);
    assert_eq!(
        reader
            .find_route_stops_by_route_ordered(fx.base.id)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn delete_draft_rejects_missing_route() {
    let conn = setup();
    let missing = Uuid::new_v4();

    let err = DraftService::new(store(&conn))
        .delete_draft(missing)
        .unwrap_err();

    assert!(matches!(err, RouteServiceError::RouteNotFound(id) if id == missing));
}

#[test]
fn publish_of_draft_built_on_a_draft_drops_every_marker() {
    let conn = setup();
    let (fx, draft) = merged_draft(&conn);
    let nested = RouteMergeService::new(store(&conn))
        .merge_into_draft(&MergeRequest::new(
            draft.id,
            fx.donor.id,
            vec![fx.donor_c.id],
        ))
        .unwrap();
    assert_eq!(nested.route_number, "10-DRAFT-DRAFT");

    let published = DraftService::new(store(&conn))
        .publish(nested.id, &PublishOptions::default())
        .unwrap();

    assert_eq!(published.route_number, "10");
    assert!(!published.is_draft);
    assert_eq!(published.source_route_id, Some(draft.id));
}
