//! Integration test: constraints and planner settings loaded from TOML
//! fixtures and built through the factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clankers_constraints::prelude::*;
use clankers_constraints::ConfigError;
use clankers_test_utils::cartesian_wrist;

fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("tests").join("fixtures").join(name)
}

fn planner_config() -> ConstraintConfig {
    ConstraintConfig::from_file(fixture_path("planner.toml")).unwrap()
}

#[test]
fn planner_config_loads() {
    let config = planner_config();
    assert_eq!(config.checker_tolerance, Some(0.00001));
    assert!(!config.orientation_supported);
}

#[test]
fn keep_level_fixture() {
    let constraints = Constraints::from_file(fixture_path("keep_level.toml")).unwrap();
    let c = create_constraint(Arc::new(cartesian_wrist()), &constraints, &planner_config()).unwrap();
    assert_eq!(c.kind(), ConstraintKind::EqualityPosition);
    assert_eq!(c.dimension_mask(), Some(&[false, false, true]));

    let mut state = c.new_state();
    assert!(c.is_satisfied(&[0.4, -0.7, 0.3, 1.0, 0.2, 0.0], &mut state).unwrap());
    assert!(!c.is_satisfied(&[0.4, -0.7, 0.35, 1.0, 0.2, 0.0], &mut state).unwrap());
}

#[test]
fn slide_rail_fixture() {
    let constraints = Constraints::from_file(fixture_path("slide_rail.toml")).unwrap();
    let c = create_constraint(Arc::new(cartesian_wrist()), &constraints, &planner_config()).unwrap();
    assert_eq!(c.kind(), ConstraintKind::LinearSystemPosition);

    let mut state = c.new_state();
    assert!(c.is_satisfied(&[0.4, 0.0, 0.4, 0.0, 0.0, 0.0], &mut state).unwrap());
    // Beyond the end points the line continues.
    assert!(c.is_satisfied(&[0.9, 0.0, 0.4, 0.5, 0.0, 0.0], &mut state).unwrap());
    assert!(!c.is_satisfied(&[0.4, 0.1, 0.4, 0.0, 0.0, 0.0], &mut state).unwrap());
}

#[test]
fn upright_tool_fixture() {
    let constraints = Constraints::from_file(fixture_path("upright_tool.toml")).unwrap();
    let c = create_constraint(Arc::new(cartesian_wrist()), &constraints, &planner_config()).unwrap();
    assert_eq!(c.kind(), ConstraintKind::Orientation);
    assert!(!c.is_supported());

    let mut state = c.new_state();
    // Spinning about z is free; tilting about x past 0.1 rad is not.
    assert!(c.is_satisfied(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0], &mut state).unwrap());
    assert!(c.is_satisfied(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.05], &mut state).unwrap());
    assert!(!c.is_satisfied(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.3], &mut state).unwrap());
}

#[test]
fn description_survives_toml_round_trip() {
    let constraints = Constraints::from_file(fixture_path("slide_rail.toml")).unwrap();
    let text = toml::to_string(&constraints).unwrap();
    assert_eq!(Constraints::from_toml_str(&text).unwrap(), constraints);
}

#[test]
fn missing_file_is_io_error() {
    let err = Constraints::from_file(fixture_path("does_not_exist.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn fixture_for_wrong_link_is_rejected() {
    let mut constraints = Constraints::from_file(fixture_path("keep_level.toml")).unwrap();
    constraints.position_constraints[0].link_name = "gripper".into();
    let err = create_constraint(Arc::new(cartesian_wrist()), &constraints, &planner_config())
        .unwrap_err();
    assert!(matches!(
        err,
        ConstraintError::Config(ConfigError::UnknownLink(ref link)) if link == "gripper"
    ));
}
