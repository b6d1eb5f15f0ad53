//! Tests for command dispatch through `execute_command`.

use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use decaymatch::cli::{execute_command, Cli};
use decaymatch::exitcode;

fn run(args: &[&str]) -> Result<(), decaymatch::cli::CliError> {
    let cli = Cli::try_parse_from(args).expect("parse args");
    execute_command(&cli)
}

fn fixture() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/dstar_candidates.jsonl")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn given_project_dir_when_config_init_then_writes_template_once() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();

    run(&["decaymatch", "-C", &dir_arg, "config", "init"]).unwrap();
    assert!(dir.path().join(".decaymatch.toml").exists());

    let err = run(&["decaymatch", "-C", &dir_arg, "config", "init"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);

    run(&["decaymatch", "-C", &dir_arg, "config", "init", "--force"]).unwrap();
    run(&["decaymatch", "-C", &dir_arg, "config", "show"]).unwrap();
}

#[test]
fn given_fixture_when_filtering_then_succeeds() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();
    let file = fixture();

    run(&[
        "decaymatch",
        "-C",
        &dir_arg,
        "filter",
        "D*+ -> [D0 -> K- pi+] pi+",
        &file,
        "--indices",
    ])
    .unwrap();
}

#[test]
fn given_default_channels_when_classifying_then_succeeds() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();
    let file = fixture();

    run(&["decaymatch", "-C", &dir_arg, "classify", &file, "--json"]).unwrap();
}

#[test]
fn given_unknown_particle_when_showing_then_dataerr() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();

    let err = run(&["decaymatch", "-C", &dir_arg, "show", "D0 -> K- piplus"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_missing_candidate_file_when_filtering_then_noinput() {
    let dir = TempDir::new().unwrap();
    let dir_arg = dir.path().to_string_lossy().into_owned();
    let missing = dir.path().join("missing.jsonl").to_string_lossy().into_owned();

    let err = run(&["decaymatch", "-C", &dir_arg, "filter", "D0 -> K- pi+", &missing])
        .unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_no_subcommand_when_executing_then_usage() {
    let err = run(&["decaymatch"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}
