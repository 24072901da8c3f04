//! Tests for ForestBuilder

use std::path::Path;

use rstest::rstest;

use sdsloc::domain::{DomainError, ForestBuilder, Location};
use sdsloc::infrastructure::seed::{sample_locations, SeedDocument};

fn parse(toml: &str) -> Vec<Location> {
    SeedDocument::parse(toml, Path::new("inline.toml"))
        .expect("parse seed")
        .locations
}

const NESTED: &str = r#"
[[locations]]
id = "a"
name = "Site A"

[[locations.children]]
id = "a-1"
name = "Hall 1"
parentLocationId = "a"

[[locations.children]]
id = "a-2"
name = "Hall 2"
parentLocationId = "a"

[[locations.children.children]]
id = "a-2-1"
name = "Cabinet"
parentLocationId = "a-2"

[[locations]]
id = "b"
name = "Site B"
"#;

#[test]
fn given_nested_locations_when_building_then_preserves_sibling_order() {
    // Act
    let forest = ForestBuilder::new().build(parse(NESTED)).unwrap();

    // Assert
    let order: Vec<&str> = forest.iter().map(|(_, n)| n.id()).collect();
    assert_eq!(order, vec!["a", "a-1", "a-2", "a-2-1", "b"]);
    assert_eq!(forest.roots().len(), 2);
    assert_eq!(forest.depth(), 3);
}

#[test]
fn given_built_forest_when_converting_back_then_matches_input() {
    let input = parse(NESTED);
    let forest = ForestBuilder::new().build(input.clone()).unwrap();
    assert_eq!(forest.to_locations(), input);
}

#[test]
fn given_sample_data_when_building_then_all_locations_indexed() {
    let forest = ForestBuilder::default().build(sample_locations()).unwrap();

    assert_eq!(forest.len(), 16);
    assert_eq!(
        forest.leaf_ids(),
        vec![
            "loc1-1-1-1",
            "loc1-1-1-2",
            "loc1-1-2-1",
            "loc1-2-1-1",
            "loc1-2-1-2",
            "loc2-1-1-1",
            "loc2-1-1-2"
        ]
    );
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn given_blank_name_when_building_then_fails_validation(#[case] name: &str) {
    let toml = format!("[[locations]]\nid = \"a\"\nname = \"{name}\"\n");

    let err = ForestBuilder::new().build(parse(&toml)).unwrap_err();

    assert!(matches!(err, DomainError::Validation { field: "name", .. }));
}

#[test]
fn given_duplicate_ids_when_building_then_fails() {
    let toml = r#"
[[locations]]
id = "a"
name = "Site A"

[[locations]]
id = "a"
name = "Site A again"
"#;
    let err = ForestBuilder::new().build(parse(toml)).unwrap_err();
    assert_eq!(err, DomainError::DuplicateId("a".to_string()));
}

#[test]
fn given_wrong_parent_id_when_building_strict_then_reports_mismatch() {
    let toml = r#"
[[locations]]
id = "a"
name = "Site A"

[[locations.children]]
id = "a-1"
name = "Hall 1"
"#;
    let err = ForestBuilder::new().build(parse(toml)).unwrap_err();
    assert_eq!(
        err,
        DomainError::ParentMismatch {
            id: "a-1".to_string(),
            declared: None,
            actual: Some("a".to_string()),
        }
    );
}

#[test]
fn given_wrong_parent_id_when_building_lenient_then_fixes_from_nesting() {
    let toml = r#"
[[locations]]
id = "a"
name = "Site A"
parentLocationId = "ghost"

[[locations.children]]
id = "a-1"
name = "Hall 1"
"#;
    let forest = ForestBuilder::new()
        .lenient_parents()
        .build(parse(toml))
        .unwrap();

    assert!(forest.find_by_id("a").unwrap().data.is_root());
    assert_eq!(
        forest.find_by_id("a-1").unwrap().data.parent_location_id.as_deref(),
        Some("a")
    );
}

#[test]
fn given_no_locations_when_building_then_forest_is_empty() {
    let forest = ForestBuilder::new().build(Vec::new()).unwrap();
    assert!(forest.is_empty());
}
