use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_amdir_map"))
        .current_dir(dir)
        .env_remove("LOG_FILE_PATH")
        .args(args)
        .output()
        .expect("failed to run amdir_map")
}

/// Copies the fixtures into `dir` under their default file names.
fn copy_fixtures(dir: &Path) {
    for name in [
        "ancientmetagenome-anthropogenic.tsv",
        "ancientmetagenome-environmental.tsv",
        "ancientmetagenome-hostassociated.tsv",
        "ancientsinglegenome-hostassociated.tsv",
    ] {
        fs::copy(fixture(name), dir.join(name)).unwrap();
    }
}

#[test]
fn test_defaults_read_and_write_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());

    let out = run(dir.path(), &[]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let value: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("map.geo.json")).unwrap())
            .unwrap();
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(value["features"].as_array().unwrap().len(), 8);
}

#[test]
fn test_explicit_paths_and_summary_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("custom.geo.json");

    let anthropogenic = fixture("ancientmetagenome-anthropogenic.tsv");
    let environmental = fixture("ancientmetagenome-environmental.tsv");
    let meta_host = fixture("ancientmetagenome-hostassociated.tsv");
    let single_host = fixture("ancientsinglegenome-hostassociated.tsv");

    let out = run(
        dir.path(),
        &[
            "--anthropogenic",
            anthropogenic.to_str().unwrap(),
            "--environmental",
            environmental.to_str().unwrap(),
            "--meta_host",
            meta_host.to_str().unwrap(),
            "--single_host",
            single_host.to_str().unwrap(),
            "--geojson",
            output.to_str().unwrap(),
            "--seed",
            "5",
            "--summary-json",
        ],
    );

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(output.exists());

    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["features"], 8);
    assert_eq!(summary["duplicates_dropped"], 1);
}

#[test]
fn test_missing_input_exits_nonzero_without_output() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());
    fs::remove_file(dir.path().join("ancientmetagenome-environmental.tsv")).unwrap();

    let out = run(dir.path(), &[]);

    assert!(!out.status.success());
    assert!(!dir.path().join("map.geo.json").exists());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("ancientmetagenome-environmental.tsv"), "{stderr}");
}

#[test]
fn test_malformed_input_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());
    fs::write(
        dir.path().join("ancientmetagenome-anthropogenic.tsv"),
        "latitude\tlongitude\n1.0\t2.0\t3.0\n",
    )
    .unwrap();

    let out = run(dir.path(), &[]);

    assert!(!out.status.success());
    assert!(!dir.path().join("map.geo.json").exists());
}

#[test]
fn test_output_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());
    fs::create_dir(dir.path().join("out")).unwrap();

    let out = run(dir.path(), &["--geojson", "out"]);

    assert!(!out.status.success());
}
