// crates/dataset-registry-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the dataset-registry binary.
// Purpose: Ensure every command reads and writes registry state through the
//          configured store and reports failures with stable kinds.
// Dependencies: dataset-registry-cli binary
// ============================================================================

//! ## Overview
//! Runs the CLI binary against a temporary `SQLite`-backed config so state
//! carries across invocations, and checks JSON output on stdout and error
//! kinds on stderr.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn registry_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dataset-registry"))
}

/// Temporary workspace holding a config file, database, and audit log.
struct Workspace {
    /// Root directory.
    dir: TempDir,
    /// Config file path.
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db = dir.path().join("registry.db");
        let audit = dir.path().join("audit.jsonl");
        let config = dir.path().join("dataset-registry.toml");
        let contents = format!(
            "[registry]\nadmin = \"admin\"\nmax_page_size = 2\n\n[store]\ntype = \"sqlite\"\npath = {db:?}\n\n[audit]\npath = {audit:?}\n",
            db = db.to_string_lossy(),
            audit = audit.to_string_lossy(),
        );
        fs::write(&config, contents).expect("write config");
        Self {
            dir,
            config,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(registry_bin())
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("run dataset-registry")
    }

    fn ok(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout json")
    }

    fn err_kind(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
        let value: Value = serde_json::from_slice(&output.stderr).expect("stderr json");
        value["error"]["kind"].as_str().expect("error kind").to_string()
    }

    fn write_input(&self, name: &str, value: &Value) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, serde_json::to_vec(value).expect("encode input")).expect("write input");
        path.to_string_lossy().into_owned()
    }

    fn audit_lines(&self) -> Vec<Value> {
        let contents = fs::read_to_string(self.dir.path().join("audit.jsonl")).unwrap_or_default();
        contents.lines().map(|line| serde_json::from_str(line).expect("audit json")).collect()
    }
}

fn fields() -> Value {
    json!({
        "name": "Arctic buoy",
        "description": "Sea ice temperature",
        "data_type": "temperature",
        "collection_date": 1_700_000_000_u64,
        "altitude_min": 0,
        "altitude_max": 5,
        "latitude": 85_000_000,
        "longitude": -150_000_000,
        "ipfs_hash": "",
        "is_public": true
    })
}

fn config_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies config validation reports success without touching the store.
#[test]
fn config_validate_accepts_valid_config() {
    let workspace = Workspace::new();
    let value = workspace.ok(&["config", "validate"]);
    assert_eq!(value, json!({ "valid": true }));
    assert!(!workspace.dir.path().join("registry.db").exists());
}

/// Verifies config validation fails closed on an out-of-range page size.
#[test]
fn config_validate_rejects_bad_page_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[registry]\nadmin = \"admin\"\nmax_page_size = 0\n").unwrap();
    let output = Command::new(registry_bin())
        .args(["--config", &config_path(&path), "config", "validate"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let value: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["error"]["kind"], "config");
    assert!(value["error"]["message"].as_str().unwrap().contains("max_page_size"));
}

/// Walks register, reads, update, freeze, and transfer across invocations.
#[test]
fn owner_lifecycle_persists_between_invocations() {
    let workspace = Workspace::new();
    let input = workspace.write_input("fields.json", &fields());
    for expected in 1 ..= 3 {
        let value = workspace.ok(&["register", "--caller", "alice", "--input", &input]);
        assert_eq!(value, json!({ "id": expected }));
    }
    assert_eq!(workspace.ok(&["count"]), json!({ "count": 3 }));

    let record = workspace.ok(&["get", "--id", "2"]);
    assert_eq!(record["owner"], "alice");
    assert_eq!(record["mutability"], "editable");
    assert_eq!(record["status"], "active");

    let update = workspace.write_input(
        "update.json",
        &json!({ "name": "Buoy 7", "description": "Recalibrated", "data_type": "temp", "is_public": false }),
    );
    workspace.ok(&["update", "--caller", "alice", "--id", "2", "--input", &update]);
    assert_eq!(workspace.ok(&["get", "--id", "2"])["name"], "Buoy 7");

    workspace.ok(&["freeze", "--caller", "alice", "--id", "2"]);
    assert_eq!(
        workspace.err_kind(&["update", "--caller", "alice", "--id", "2", "--input", &update]),
        "metadata_frozen"
    );

    workspace.ok(&["transfer", "--caller", "alice", "--id", "1", "--new-owner", "bob"]);
    assert_eq!(workspace.ok(&["owner-ids", "--owner", "alice"])["ids"], json!([2, 3]));
    assert_eq!(workspace.ok(&["owner-ids", "--owner", "bob"])["ids"], json!([1]));
    assert_eq!(
        workspace.err_kind(&["transfer", "--caller", "alice", "--id", "1", "--new-owner", "carol"]),
        "not_authorized"
    );
}

/// Verifies page clamping and cursors through the binary.
#[test]
fn pages_follow_configured_maximum() {
    let workspace = Workspace::new();
    let input = workspace.write_input("fields.json", &fields());
    for _ in 0 .. 3 {
        workspace.ok(&["register", "--caller", "alice", "--input", &input]);
    }
    let first = workspace.ok(&["page-ids", "--limit", "10"]);
    assert_eq!(first, json!({ "items": [1, 2], "next_offset": 2 }));
    let rest = workspace.ok(&["page-ids", "--offset", "2"]);
    assert_eq!(rest, json!({ "items": [3], "next_offset": null }));

    let owner_page = workspace.ok(&["page-owner-ids", "--owner", "alice", "--offset", "1"]);
    assert_eq!(owner_page, json!({ "items": [2, 3], "next_offset": null }));

    let records = workspace.ok(&["page-records", "--limit", "1"]);
    assert_eq!(records["items"][0]["id"], 1);
    assert_eq!(records["next_offset"], 1);

    let owner_records = workspace.ok(&["page-owner-records", "--owner", "nobody"]);
    assert_eq!(owner_records, json!({ "items": [], "next_offset": null }));
}

/// Verifies admin import, pause gating, and admin replacement.
#[test]
fn admin_controls_gate_mutations() {
    let workspace = Workspace::new();
    let input = workspace.write_input("fields.json", &fields());
    let import = workspace.write_input(
        "import.json",
        &json!({
            "id": 50,
            "owner": "carol",
            "fields": fields(),
            "mutability": "frozen",
            "created_at": 1_600_000_000_u64,
            "status": "deprecated"
        }),
    );
    assert_eq!(workspace.err_kind(&["import", "--caller", "alice", "--input", &import]), "not_authorized");
    assert_eq!(workspace.ok(&["import", "--caller", "admin", "--input", &import]), json!({ "id": 50 }));
    assert_eq!(workspace.ok(&["count"]), json!({ "count": 50 }));
    assert_eq!(workspace.err_kind(&["import", "--caller", "admin", "--input", &import]), "already_exists");

    assert_eq!(workspace.ok(&["set-paused", "--caller", "admin", "--paused", "true"]), json!({ "paused": true }));
    assert_eq!(workspace.ok(&["paused"]), json!({ "paused": true }));
    assert_eq!(
        workspace.err_kind(&["register", "--caller", "alice", "--input", &input]),
        "contract_paused"
    );
    assert_eq!(workspace.ok(&["register", "--caller", "admin", "--input", &input]), json!({ "id": 51 }));

    assert_eq!(
        workspace.ok(&["set-admin", "--caller", "admin", "--new-admin", "ops"]),
        json!({ "admin": "ops" })
    );
    assert_eq!(workspace.ok(&["admin"]), json!({ "admin": "ops" }));
    assert_eq!(
        workspace.err_kind(&["set-paused", "--caller", "admin", "--paused", "false"]),
        "not_authorized"
    );
}

/// Verifies error kinds for bad ids and malformed inputs.
#[test]
fn invalid_requests_report_stable_kinds() {
    let workspace = Workspace::new();
    assert_eq!(workspace.err_kind(&["get", "--id", "0"]), "not_found");
    assert_eq!(workspace.err_kind(&["get", "--id", "7"]), "not_found");

    let mut bad = fields();
    bad["latitude"] = json!(90_000_001);
    let input = workspace.write_input("bad.json", &bad);
    assert_eq!(workspace.err_kind(&["register", "--caller", "alice", "--input", &input]), "invalid_params");

    let malformed = workspace.write_input("malformed.json", &json!({ "name": "x" }));
    assert_eq!(workspace.err_kind(&["register", "--caller", "alice", "--input", &malformed]), "input");

    let beyond_ceiling = workspace.write_input(
        "ceiling.json",
        &json!({
            "id": 9_223_372_036_854_775_808_u64,
            "owner": "carol",
            "fields": fields(),
            "mutability": "editable",
            "created_at": 1_600_000_000_u64,
            "status": "active"
        }),
    );
    assert_eq!(
        workspace.err_kind(&["import", "--caller", "admin", "--input", &beyond_ceiling]),
        "invalid_params"
    );
    assert_eq!(workspace.err_kind(&["register", "--caller", " ", "--input", &input]), "invalid_params");
    assert_eq!(workspace.ok(&["count"]), json!({ "count": 0 }));
}

/// Verifies each mutation appends one audit line.
#[test]
fn mutations_are_audited_to_configured_file() {
    let workspace = Workspace::new();
    let input = workspace.write_input("fields.json", &fields());
    workspace.ok(&["register", "--caller", "alice", "--input", &input]);
    workspace.err_kind(&["freeze", "--caller", "bob", "--id", "1"]);
    workspace.ok(&["count"]);

    let lines = workspace.audit_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["operation"], "register");
    assert_eq!(lines[0]["outcome"], "ok");
    assert_eq!(lines[1]["operation"], "freeze_metadata");
    assert_eq!(lines[1]["error_kind"], "not_authorized");
}
