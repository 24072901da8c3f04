//! Tests for portal navigation and dashboard

use std::sync::Arc;

use rstest::{fixture, rstest};

use sdsloc::application::{
    DashboardSummary, LocationService, NavigationIntent, NewLocation, Portal, Section,
};
use sdsloc::config::Settings;
use sdsloc::domain::{LocationForest, LocationRecord};
use sdsloc::infrastructure::traits::MemoryFileSystem;
use sdsloc::infrastructure::ServiceContainer;
use sdsloc::util::testing;

#[fixture]
fn portal() -> Portal {
    testing::init_test_setup();
    ServiceContainer::with_deps(Settings::default(), Arc::new(MemoryFileSystem::new()))
        .portal()
        .unwrap()
}

#[rstest]
fn given_new_portal_when_created_then_shows_dashboard(portal: Portal) {
    assert_eq!(portal.section(), Section::Dashboard);
    assert!(portal.selected_location().is_none());
    assert!(portal.location_detail().is_none());
}

#[rstest]
fn given_view_location_intent_when_processing_then_selects_location(mut portal: Portal) {
    // Arrange
    let navigator = portal.navigator();
    navigator.view_location("loc1-2-1").unwrap();

    // Act
    let applied = portal.process_pending();

    // Assert
    assert_eq!(applied, 1);
    assert_eq!(portal.section(), Section::Locations);
    assert_eq!(portal.selected_location(), Some("loc1-2-1"));
    assert_eq!(portal.location_detail().unwrap().row.name, "Assembly Line");
}

#[rstest]
fn given_unknown_location_intent_when_processing_then_ignored(mut portal: Portal) {
    portal.navigator().view_location("ghost").unwrap();

    assert_eq!(portal.process_pending(), 0);
    assert_eq!(portal.section(), Section::Dashboard);
    assert!(portal.selected_location().is_none());
}

#[rstest]
fn given_several_intents_when_processing_then_applied_in_order(mut portal: Portal) {
    let navigator = portal.navigator();
    navigator.view_location("loc1").unwrap();
    navigator.view_document("sds-1234").unwrap();
    navigator
        .send(NavigationIntent::ViewLocation("loc2".to_string()))
        .unwrap();

    assert_eq!(portal.process_pending(), 3);
    assert_eq!(portal.section(), Section::Locations);
    assert_eq!(portal.selected_location(), Some("loc2"));
    assert_eq!(portal.selected_document(), Some("sds-1234"));
}

#[rstest]
fn given_document_intent_when_processing_then_switches_to_files(mut portal: Portal) {
    portal.navigator().view_document("sds-77").unwrap();
    portal.process_pending();
    assert_eq!(portal.section(), Section::Files);
    assert_eq!(portal.section().to_string(), "My SDS Files");
}

#[rstest]
fn given_nothing_queued_when_processing_then_no_change(mut portal: Portal) {
    portal.show(Section::Files);
    assert_eq!(portal.process_pending(), 0);
    assert_eq!(portal.section(), Section::Files);
}

#[rstest]
fn given_sample_data_when_summarizing_then_counts_match(portal: Portal) {
    let summary = portal.dashboard();
    assert_eq!(
        summary,
        DashboardSummary {
            total_sds: 132,
            locations: 16,
            favorites: 4,
            roots: 2,
            depth: 4,
        }
    );
}

#[rstest]
fn given_added_location_when_navigating_then_reachable(mut portal: Portal) {
    let id = portal
        .service_mut()
        .create_location(NewLocation::new("Loading Dock").under("loc2"))
        .unwrap();

    portal.navigator().view_location(id.clone()).unwrap();
    portal.process_pending();

    let detail = portal.location_detail().unwrap();
    assert_eq!(detail.row.id, id);
    assert_eq!(portal.dashboard().locations, 17);
}

#[test]
fn given_empty_forest_when_summarizing_then_all_zero() {
    assert_eq!(
        DashboardSummary::from_forest(&LocationForest::new()),
        DashboardSummary::default()
    );
}

fn large_counts_portal() -> Portal {
    let mut forest = LocationForest::new();
    for (id, parent) in [("a", None), ("a-1", Some("a")), ("b", None)] {
        forest
            .insert_under_parent(LocationRecord {
                id: id.to_string(),
                name: id.to_uppercase(),
                favorite: false,
                parent_location_id: parent.map(str::to_string),
                address: None,
                sds_count: Some(3_000_000_000),
            })
            .unwrap();
    }
    Portal::new(LocationService::new(forest, &Settings::default()))
}

#[test]
fn given_counts_near_u32_max_when_summarizing_then_total_does_not_overflow() {
    let portal = large_counts_portal();
    assert_eq!(portal.dashboard().total_sds, 9_000_000_000);
}

#[test]
fn given_counts_near_u32_max_when_viewing_parent_then_subtree_total_is_exact() {
    let mut portal = large_counts_portal();
    portal.navigator().view_location("a").unwrap();
    portal.process_pending();

    let detail = portal.location_detail().unwrap();

    assert_eq!(detail.row.sds_count, 3_000_000_000);
    assert_eq!(detail.total_sds_count, 6_000_000_000);
}
