//! Integration tests for Settings loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Local: UNION with negation support (analysis adds particles)
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use decaymatch::config::Settings;
use decaymatch::infrastructure::di::ServiceContainer;

#[test]
fn given_no_local_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert!(settings.matching.final_state.contains(&"pi+".to_string()));
    assert!(settings.matching.excluded_children.contains(&"gamma".to_string()));
    assert_eq!(settings.channels.len(), 2);
}

#[test]
fn given_local_final_state_with_negation_when_load_then_unions_and_removes() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".decaymatch.toml"),
        r#"
[matching]
final_state = ["p+", "!K+"]
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let fs_names = &settings.matching.final_state;
    assert!(fs_names.contains(&"p+".to_string()));
    assert!(fs_names.contains(&"pi+".to_string()));
    assert!(!fs_names.contains(&"K+".to_string()));
}

#[test]
fn given_local_particles_and_channels_when_building_container_then_resolved() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".decaymatch.toml"),
        r#"
[particles]
"X(3872)" = 9920443

[[channels]]
name = "XJpsi"
mode_id = 7
pattern = "X(3872) -> J/psi pi+ pi-"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");
    let container = ServiceContainer::new(settings).expect("container");

    assert_eq!(container.table().code_of("X(3872)").unwrap(), 9920443);
    let channels = container.configured_channels().unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].mode_id, 7);
    assert_eq!(channels[0].pattern.children().len(), 3);
}

#[test]
fn given_particles_file_when_building_table_then_entries_registered() {
    let dir = TempDir::new().unwrap();
    let particles = dir.path().join("particles.toml");
    fs::write(&particles, "\"Z_c(3900)+\" = 9044213\n").unwrap();
    fs::write(
        dir.path().join(".decaymatch.toml"),
        format!("particles_file = {:?}\n", particles.to_string_lossy()),
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");
    let table = settings.particle_table().expect("particle table");

    assert_eq!(table.code_of("Z_c(3900)+").unwrap(), 9044213);
}

#[test]
fn given_unknown_final_state_name_when_building_container_then_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".decaymatch.toml"),
        r#"
[matching]
final_state = ["pion"]
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert!(ServiceContainer::new(settings).is_err());
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".decaymatch.toml"), "[matching\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains("config error"), "{err}");
}

#[test]
fn given_relative_particles_file_when_loading_from_project_dir_then_read_next_to_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("particles.toml"), "\"Z_c(3900)+\" = 9044213\n").unwrap();
    fs::write(
        dir.path().join(".decaymatch.toml"),
        "particles_file = \"particles.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(
        settings.particles_file.as_deref(),
        Some(dir.path().join("particles.toml").as_path())
    );
    let table = settings.particle_table().expect("particle table");
    assert_eq!(table.code_of("Z_c(3900)+").unwrap(), 9044213);
}
