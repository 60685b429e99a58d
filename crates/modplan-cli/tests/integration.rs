//! Integration tests for the modplan binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Isolated home: config file and session log live in a temp dir
struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Option<Self> {
        TempDir::new().ok().map(|dir| Harness { dir })
    }

    /// Start from the fixture config instead of an empty one
    fn with_fixture_config() -> Option<Self> {
        let harness = Self::new()?;
        fs::copy(fixture("modplan.toml"), harness.config_path()).ok()?;
        Some(harness)
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("modplan.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("modplan");
        cmd.env("MODPLAN_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("MODPLAN_LOG")
            .current_dir(self.dir.path());
        cmd
    }
}

#[test]
fn test_version() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modplan"));
}

#[test]
fn test_help() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugin build-module dependency resolver"));
}

#[test]
fn test_invalid_command() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd().arg("invalid").assert().failure();
}

#[test]
fn test_resolve_requires_paths() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_resolve_prints_build_order() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("resolve")
        .arg(fixture("layered.module.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("editor target, engine 5.0"))
        .stdout(predicate::str::contains("1. Core"))
        .stdout(predicate::str::contains("2. Engine"))
        .stdout(predicate::str::contains("3. Editor"))
        .stdout(predicate::str::contains("4. Tools"));
}

#[test]
fn test_resolve_reports_unknown_dynamic_dependency() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "--engine-version", "5.1"])
        .arg(fixture("hot_reload.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Module 'Editor' depends on unknown module 'HotReloadTool'",
        ))
        .stderr(predicate::str::contains("[unknown-module]"));
}

#[test]
fn test_resolve_reports_cycle_path() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("resolve")
        .arg(fixture("cycle.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Cyclic dependency: Alpha -> Beta -> Alpha",
        ));
}

#[test]
fn test_tether_conflict_rejected_by_default() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("resolve")
        .arg(fixture("tether"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Module 'TetherEditor' lists 'PropertyEditor' as both a public and a private dependency",
        ))
        .stderr(predicate::str::contains("more than once").not());
}

#[test]
fn test_tether_resolves_with_shared_visibility() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "--allow-shared-visibility"])
        .arg(fixture("tether"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Tether"))
        .stdout(predicate::str::contains("TetherEditor"))
        .stdout(predicate::str::contains("(external)"));
}

#[test]
fn test_tether_editor_rejected_for_game_target() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "--allow-shared-visibility", "--target", "game"])
        .arg(fixture("tether"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Module 'TetherEditor' is restricted to editor targets but the build target is game",
        ));
}

#[test]
fn test_resolve_json_plan_applies_version_gates() {
    let Some(h) = Harness::new() else {
        return;
    };
    let Ok(output) = h
        .cmd()
        .args(["resolve", "--json", "--allow-shared-visibility", "-e", "4.27"])
        .arg(fixture("tether"))
        .output()
    else {
        return;
    };
    assert!(output.status.success());

    let Ok(plan) = serde_json::from_slice::<serde_json::Value>(&output.stdout) else {
        panic!("stdout should be a JSON build plan");
    };
    assert_eq!(plan["target"]["engine_version"], "4.27");

    let order = plan["build_order"].as_array().cloned().unwrap_or_default();
    assert_eq!(order.last(), Some(&serde_json::json!("TetherEditor")));

    let modules = plan["modules"].as_array().cloned().unwrap_or_default();
    let Some(editor) = modules.iter().find(|m| m["name"] == "TetherEditor") else {
        panic!("TetherEditor missing from plan");
    };
    let private = editor["private"].as_array().cloned().unwrap_or_default();
    assert!(private.contains(&serde_json::json!("Tether")));
    assert!(!private.contains(&serde_json::json!("LevelEditor")));
    assert!(!private.contains(&serde_json::json!("PropertyEditor")));
    assert_eq!(editor["pch_usage"], "explicit-or-shared");
}

#[test]
fn test_resolve_json_reports_errors() {
    let Some(h) = Harness::new() else {
        return;
    };
    let Ok(output) = h
        .cmd()
        .args(["resolve", "--json"])
        .arg(fixture("cycle.module.toml"))
        .output()
    else {
        return;
    };
    assert_eq!(output.status.code(), Some(1));

    let Ok(report) = serde_json::from_slice::<serde_json::Value>(&output.stdout) else {
        panic!("stdout should be a JSON error report");
    };
    assert_eq!(report["errors"][0]["kind"], "cyclic-dependency");
    assert_eq!(report["errors"][0]["module"], "Alpha");
}

#[test]
fn test_fail_fast_reports_single_error() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "--fail-fast", "--target", "game"])
        .arg(fixture("tether"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed with 1 error(s)"));
}

#[test]
fn test_aggregate_reports_all_errors() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "--target", "game"])
        .arg(fixture("tether"))
        .arg(fixture("cycle.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[unsupported-target-type]"))
        .stderr(predicate::str::contains("[cyclic-dependency]"))
        .stderr(predicate::str::contains("failed with 2 error(s)"));
}

#[test]
fn test_check_lists_modules_and_failures() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["check", "--target", "server"])
        .arg(fixture("layered.module.toml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Module check (server target"))
        .stdout(predicate::str::contains("Engine (1 public, 0 private, 0 dynamic)"))
        .stdout(predicate::str::contains("[unsupported-target-type]"));
}

#[test]
fn test_check_passes_without_assembling() {
    let Some(h) = Harness::new() else {
        return;
    };
    // Unknown references are a graph error, not a per-module one
    h.cmd()
        .arg("check")
        .arg(fixture("hot_reload.module.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Editor (0 public, 1 private, 1 dynamic)"));
}

#[test]
fn test_graph_single_module() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["graph", "--module", "Engine"])
        .arg(fixture("layered.module.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("public:"))
        .stdout(predicate::str::contains("dependents:"))
        .stdout(predicate::str::contains("Editor"))
        .stdout(predicate::str::contains("visible:"));
}

#[test]
fn test_graph_unknown_module() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["graph", "--module", "Nope"])
        .arg(fixture("layered.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Module 'Nope' is not part of the resolved graph",
        ));
}

#[test]
fn test_missing_path_reported() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["resolve", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_init_then_resolve() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Next steps"));
    assert!(h.dir.path().join("plugin.module.toml").exists());

    h.cmd()
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    h.cmd().args(["init", "--force"]).assert().success();

    h.cmd()
        .args(["resolve", "plugin.module.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MyPluginEditor"));
}

#[test]
fn test_quiet_suppresses_status_messages() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["-q", "resolve"])
        .arg(fixture("layered.module.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Core"))
        .stderr(predicate::str::contains("Resolved").not());
}

#[test]
fn test_config_set_get_show() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["config", "set", "engine-version", "4.27"])
        .assert()
        .success();
    h.cmd()
        .args(["config", "get", "engine-version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4.27"));
    h.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"))
        .stdout(predicate::str::contains("engine-version: 4.27"));
    h.cmd()
        .args(["config", "unset", "engine-version"])
        .assert()
        .success();
    h.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("engine-version").not());
}

#[test]
fn test_config_rejects_bad_values() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["config", "set", "engine-version", "banana"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for 'engine-version'"));
    h.cmd()
        .args(["config", "set", "python-version", "3.12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown config key 'python-version'"));
}

#[test]
fn test_config_path() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modplan.toml"));
}

#[test]
fn test_config_no_action() {
    let Some(h) = Harness::new() else {
        return;
    };
    h.cmd()
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_config_defaults_apply_and_flags_override() {
    let Some(h) = Harness::with_fixture_config() else {
        return;
    };
    // Config selects a game target, which the editor module refuses
    h.cmd()
        .arg("resolve")
        .arg(fixture("hot_reload.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("the build target is game"))
        .stderr(predicate::str::contains("HotReloadTool").not());

    h.cmd()
        .args(["resolve", "--target", "editor"])
        .arg(fixture("hot_reload.module.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown module 'HotReloadTool'"));
}
