//! scenario_cli_register_paper
//!
//! Drives the `gst` binary against a directory-backed store:
//! 1) `config-hash` is stable across runs.
//! 2) `register` prints one registration per distinct key and one paper call
//!    per registration.
//! 3) `show-config` prints only the requested execution.
//! 4) `--execution-id` with no matching entries fails the command.

use std::fs;
use std::path::Path;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;

const CONFIG_KEY: &str = "Project_General_Strategy_4242/config_data/config_data.json";

fn write_fixture(root: &Path) -> String {
    let store = root.join("store");
    let config_path = store.join(CONFIG_KEY);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    let config = json!([
        {
            "execution_id": "1",
            "strategy_groups": [{"strategies": [
                {"security": [
                    {"ticker": "SPX", "security_type": "IndexOption", "resolution": "Minute", "market": "USA"},
                    {"ticker": "Garch_data", "security_type": "CustomData", "resolution": "Daily"}
                ]},
                {"security": [
                    {"ticker": "SPX", "security_type": "IndexOption", "resolution": "Minute", "market": "USA"}
                ]}
            ]}]
        },
        {
            "execution_id": 2,
            "strategy_groups": [{"strategies": [{"security": [
                {"ticker": "QQQ", "security_type": "Equity", "resolution": "Minute"}
            ]}]}]
        }
    ]);
    fs::write(&config_path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();

    let settings = root.join("settings.yaml");
    fs::write(
        &settings,
        format!(
            "algorithm: General_Strategy\nproject_id: 4242\nstore_root: {}\nlogging:\n  enabled: false\n",
            store.display()
        ),
    )
    .unwrap();
    settings.to_string_lossy().to_string()
}

fn gst() -> std::process::Command {
    let mut cmd = std::process::Command::cargo_bin("gst").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn config_hash_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_fixture(dir.path());

    let a = gst().args(["config-hash", &settings]).output().unwrap();
    let b = gst().args(["config-hash", &settings]).output().unwrap();
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
    assert!(String::from_utf8_lossy(&a.stdout).starts_with("settings_hash="));
}

#[test]
fn register_dedups_against_paper_platform() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_fixture(dir.path());

    gst()
        .args(["register", "--settings", &settings])
        .assert()
        .success()
        .stdout(predicate::str::contains("registrations=2"))
        .stdout(predicate::str::contains("platform_calls=2"))
        .stdout(predicate::str::contains(
            "registration id=spx_indexoption_minute_usa category=IndexOption",
        ))
        .stdout(predicate::str::contains(
            "registration id=garch_data_customdata_daily_usa category=Garch_data",
        ))
        .stdout(predicate::str::contains("call AddIndexOption(SPX, Minute, USA)"));
}

#[test]
fn show_config_prints_requested_execution_only() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_fixture(dir.path());

    gst()
        .args(["show-config", "--settings", &settings, "--execution-id", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("execution_id=2"))
        .stdout(predicate::str::contains("QQQ"))
        .stdout(predicate::str::contains("SPX").not());
}

#[test]
fn unknown_execution_fails() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_fixture(dir.path());

    gst()
        .args(["register", "--settings", &settings, "--execution-id", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_EMPTY_FOR_EXECUTION"));
}
