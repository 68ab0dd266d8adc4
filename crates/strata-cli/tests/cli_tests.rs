//! End-to-end tests for the `strata` binary.
//!
//! Every test runs in its own temp directory with an empty `--config`
//! file so the user's real configuration never leaks in.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r##"
[[entity]]
id = "logger"
version = "1.2.0"

[[entity]]
id = "http"
version = "2.0.0"

[[entity.dependencies]]
id = "logger"
constraint = "^1.0.0"

[[entity]]
id = "web"
version = "1.0.0"

[[entity.dependencies]]
id = "http"
constraint = ">=2.0.0"

[[entity.dependencies]]
id = "logger"

[[entity]]
id = "base"
version = "1.0.0"

[entity.files]
"README.md" = "# Base\n"
"config.json" = { port = 80 }

[[entity]]
id = "api"
version = "1.0.0"
extends = ["base"]

[entity.files]
"README.md" = "# API\n"
"config.json" = { name = "api" }
"##;

const BROKEN: &str = r#"
[[entity]]
id = "broken"
version = "0.1.0"

[[entity.dependencies]]
id = "ghost"
constraint = "^1.0.0"

[[entity]]
id = "loop-a"
version = "1.0.0"

[[entity.dependencies]]
id = "loop-b"

[[entity]]
id = "loop-b"
version = "1.0.0"

[[entity.dependencies]]
id = "loop-a"
"#;

fn workspace(manifest: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("catalog.toml"), manifest).unwrap();
    fs::write(dir.path().join("empty.toml"), "").unwrap();
    dir
}

fn strata(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["--config", "empty.toml", "--manifest", "catalog.toml"]);
    cmd
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[test]
fn resolve_prints_install_order() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["resolve", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Install order for web v1.0.0 (3 entities)"))
        .stdout(predicate::str::contains("1  logger  1.2.0"))
        .stdout(predicate::str::contains("2  http    2.0.0"))
        .stdout(predicate::str::contains("3  web     1.0.0"));
}

#[test]
fn resolve_marks_installed_entities() {
    let dir = workspace(MANIFEST);
    fs::write(dir.path().join("installed.toml"), "logger = \"1.5.0\"\n").unwrap();

    strata(dir.path())
        .args(["resolve", "web", "--installed", "installed.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logger  1.2.0  [installed]"));
}

#[test]
fn resolve_dot_is_a_digraph() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["resolve", "web", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph dependencies {"))
        .stdout(predicate::str::contains("\"web\" -> \"http\""));
}

#[test]
fn resolve_json_has_envelope() {
    let dir = workspace(MANIFEST);
    let output = strata(dir.path())
        .args(["--output-format", "json", "resolve", "web"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["command"], "resolve");
    assert_eq!(doc["success"], true);
    assert_eq!(
        doc["data"]["install_order"],
        serde_json::json!(["logger", "http", "web"])
    );
}

#[test]
fn missing_dependency_fails_with_exit_2() {
    let dir = workspace(BROKEN);
    strata(dir.path())
        .args(["resolve", "broken"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("missing: ghost"))
        .stderr(predicate::str::contains("Resolution of 'broken' failed with 1 issue(s)"));
}

#[test]
fn cycle_fails_with_exit_2() {
    let dir = workspace(BROKEN);
    strata(dir.path())
        .args(["resolve", "loop-a"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("cycle: loop-a -> loop-b -> loop-a"));
}

#[test]
fn unknown_root_exits_3() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["resolve", "nope"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nope"));
}

// ── tree ──────────────────────────────────────────────────────────────────────

#[test]
fn tree_draws_branches() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["tree", "web"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("web v1.0.0\n"))
        .stdout(predicate::str::contains("http v2.0.0 (>=2.0.0)"))
        .stdout(predicate::str::contains("└── logger v1.2.0 (^1.0.0)"));
}

#[test]
fn tree_depth_limits_output() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["tree", "web", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(^1.0.0)").not());
}

#[test]
fn tree_invert_of_unknown_node_is_user_error() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["tree", "web", "--invert", "ghost"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'ghost' is not in the dependency graph"));
}

// ── analyze ───────────────────────────────────────────────────────────────────

#[test]
fn analyze_lists_each_root() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["analyze", "web", "http"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ROOT"))
        .stdout(predicate::str::contains("Dependency analysis (2 roots)"));
}

#[test]
fn analyze_recursive_fails_on_any_broken_root() {
    let dir = workspace(BROKEN);
    strata(dir.path())
        .args(["analyze", "--recursive"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("broken"))
        .stdout(predicate::str::contains("failed"))
        .stderr(predicate::str::contains("3 of 3 roots"));
}

// ── check ─────────────────────────────────────────────────────────────────────

#[test]
fn check_passes_for_clean_template() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["check", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chain: base -> api"))
        .stdout(predicate::str::contains("api: no issues"));
}

#[test]
fn check_fails_on_unsatisfied_constraint_warning() {
    let dir = workspace(
        r#"
[[entity]]
id = "app"
version = "1.0.0"

[[entity.dependencies]]
id = "lib"
constraint = "^2.0.0"

[[entity]]
id = "lib"
version = "1.0.0"
"#,
    );

    // The warning alone keeps `resolve` green but fails `check`.
    strata(dir.path()).args(["resolve", "app"]).assert().success();
    strata(dir.path())
        .args(["check", "app"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Check of 'app' found 1 issue(s)"));
}

#[test]
fn check_all_reports_every_entity() {
    let dir = workspace(BROKEN);
    strata(dir.path())
        .args(["check", "--all"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("3 entities"));
}

// ── compose ───────────────────────────────────────────────────────────────────

#[test]
fn compose_reports_chain_and_files() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["compose", "api", "--strategy", "merge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api (base -> api, merge)"))
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("README.md"));
}

#[test]
fn compose_writes_merged_files() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["compose", "api", "--strategy", "merge", "--output", "out"])
        .assert()
        .success();

    let config = fs::read_to_string(dir.path().join("out/config.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert_eq!(value, serde_json::json!({"port": 80, "name": "api"}));
    assert!(dir.path().join("out/README.md").is_file());
}

#[test]
fn compose_dry_run_writes_nothing() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["compose", "api", "--output", "out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn compose_refuses_existing_output() {
    let dir = workspace(MANIFEST);
    fs::create_dir(dir.path().join("out")).unwrap();

    strata(dir.path())
        .args(["compose", "api", "--output", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Output already exists"));
}

#[test]
fn compose_without_content_tree_is_not_found() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .args(["compose", "logger"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("logger"));
}

// ── catalog selection and config ──────────────────────────────────────────────

#[test]
fn default_manifest_is_picked_up_from_cwd() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("strata.toml"), MANIFEST).unwrap();
    fs::write(dir.path().join("empty.toml"), "").unwrap();

    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(dir.path())
        .args(["--config", "empty.toml", "resolve", "logger"])
        .assert()
        .success();
}

#[test]
fn catalog_from_config_file() {
    let dir = workspace(MANIFEST);
    fs::write(
        dir.path().join("custom.toml"),
        "[catalog]\nmanifest = \"catalog.toml\"\n",
    )
    .unwrap();

    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(dir.path())
        .args(["--config", "custom.toml", "resolve", "http"])
        .assert()
        .success();
}

#[test]
fn no_catalog_exits_4() {
    let dir = workspace(MANIFEST);
    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(dir.path())
        .args(["--config", "empty.toml", "resolve", "web"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No catalog configured"));
}

#[test]
fn env_override_is_validated() {
    let dir = workspace(MANIFEST);
    strata(dir.path())
        .env("STRATA_RESOLVER__HARD_DEPTH_CAP", "0")
        .args(["resolve", "web"])
        .assert()
        .code(4);
}

#[test]
fn unreadable_manifest_is_configuration_error() {
    let dir = workspace("this is = = not toml");
    strata(dir.path())
        .args(["resolve", "web"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("catalog.toml"));
}

// ── init / completions ────────────────────────────────────────────────────────

#[test]
fn init_local_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(dir.path())
        .args(["init", "--local"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join(".strata.toml")).unwrap();
    assert!(written.contains("[resolver]"));
    assert!(written.contains("hard_depth_cap = 20"));

    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(dir.path())
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn completions_name_the_binary() {
    Command::cargo_bin("strata")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("strata"));
}
