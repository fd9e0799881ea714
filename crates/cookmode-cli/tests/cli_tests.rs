//! CLI end-to-end tests. Every test gets its own `COOKMODE_HOME`.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECIPE: &str = r#"
name = "Soft-boiled eggs"

[[steps]]
order_index = 2
instruction = "Cool in ice water"

[[steps]]
order_index = 0
instruction = "Bring water to a boil"

[[steps]]
order_index = 1
instruction = "Boil the eggs"
duration_secs = 390
"#;

struct Env {
    home: TempDir,
    recipe: PathBuf,
}

fn env() -> Env {
    let home = TempDir::new().expect("Failed to create temporary directory");
    let recipe = home.path().join("eggs.toml");
    std::fs::write(&recipe, RECIPE).unwrap();
    Env { home, recipe }
}

impl Env {
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cookmode").expect("Failed to find cookmode binary");
        cmd.env("COOKMODE_HOME", self.home.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(output.status.success(), "{args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn start(&self) -> serde_json::Value {
        let recipe = self.recipe.to_str().unwrap().to_string();
        self.json(&["session", "start", &recipe])
    }
}

#[test]
fn recipe_show_sorts_steps() {
    let env = env();
    let recipe = env.json(&["recipe", "show", env.recipe.to_str().unwrap()]);
    assert_eq!(recipe["steps"][0]["instruction"], "Bring water to a boil");
    assert_eq!(recipe["steps"][1]["duration_secs"], 390);
}

#[test]
fn recipe_with_duplicate_order_index_fails() {
    let env = env();
    let bad = env.home.path().join("bad.toml");
    std::fs::write(
        &bad,
        "name = \"bad\"\n[[steps]]\norder_index = 0\ninstruction = \"a\"\n[[steps]]\norder_index = 0\ninstruction = \"b\"\n",
    )
    .unwrap();

    env.cmd()
        .args(["recipe", "show", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate order_index 0"));
}

#[test]
fn session_commands_without_session_fail() {
    let env = env();
    env.cmd()
        .args(["session", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved session"));
}

#[test]
fn session_walkthrough_persists_between_invocations() {
    let env = env();
    let started = env.start();
    assert_eq!(started["state"], "running");
    assert_eq!(started["current_index"], 0);

    let next = env.json(&["session", "next"]);
    assert_eq!(next["current_index"], 1);
    assert_eq!(next["steps"][0]["completed"], true);
    // Entering a timed step starts its countdown.
    assert_eq!(next["active_timers"][0]["step_key"], 1);

    let prev = env.json(&["session", "prev"]);
    assert_eq!(prev["current_index"], 0);
    assert_eq!(prev["steps"][0]["completed"], true);

    let jumped = env.json(&["session", "jump", "9"]);
    assert_eq!(jumped["current_index"], 0);

    let paused = env.json(&["session", "pause"]);
    assert_eq!(paused["state"], "paused");

    let ended = env.json(&["session", "end"]);
    assert_eq!(ended["state"], "ended");
    assert_eq!(ended["active_timers"].as_array().unwrap().len(), 0);
}

#[test]
fn timer_start_and_cancel() {
    let env = env();
    env.start();

    let timers = env.json(&["timer", "start", "2"]);
    assert_eq!(timers[0]["total_duration_secs"], 390);

    env.cmd()
        .args(["timer", "start", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("step 1 has no timer"));

    let timers = env.json(&["timer", "cancel", "2"]);
    assert_eq!(timers.as_array().unwrap().len(), 0);
}

#[test]
fn expired_timer_alerts_once_on_next_invocation() {
    let env = env();
    env.start();
    env.json(&["timer", "start", "3", "--secs", "1"]);
    std::thread::sleep(std::time::Duration::from_millis(1_500));

    env.cmd()
        .args(["timer", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("Cool in ice water"));

    env.cmd()
        .args(["timer", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cool in ice water").not());
}

#[test]
fn disabled_alerts_complete_silently() {
    let env = env();
    env.cmd()
        .args(["config", "set", "alerts.enabled", "false"])
        .assert()
        .success();
    env.start();
    env.json(&["timer", "start", "3", "--secs", "1"]);
    std::thread::sleep(std::time::Duration::from_millis(1_500));

    env.cmd()
        .env("RUST_LOG", "debug")
        .args(["timer", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("alerts disabled"))
        .stderr(predicate::str::contains("Cool in ice water").not())
        .stderr(predicate::str::contains("WARN").not())
        .stderr(predicate::str::contains("\x1b[").not());
}

#[test]
fn saved_state_names_recipe_once() {
    let env = env();
    env.start();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.home.path().join("session.json")).unwrap()).unwrap();
    assert_eq!(saved["recipe_name"], "Soft-boiled eggs");
    assert!(saved["session"].get("recipe_name").is_none());
}

#[test]
fn live_status_reports_next_deadline() {
    let env = env();
    env.start();
    env.json(&["session", "next"]);

    let status = env.json(&["live-status"]);
    assert_eq!(status["recipe_name"], "Soft-boiled eggs");
    assert_eq!(status["current_step_number"], 2);
    assert_eq!(status["total_steps"], 3);
    assert!(status["next_timer_deadline"].is_string());
    assert_eq!(status["active_step_description"], "Boil the eggs");
}

#[test]
fn config_set_and_get() {
    let env = env();
    env.cmd()
        .args(["config", "set", "timers.auto_start", "false"])
        .assert()
        .success();
    env.cmd()
        .args(["config", "get", "timers.auto_start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
    env.cmd()
        .args(["config", "set", "timers.nope", "1"])
        .assert()
        .failure();

    env.start();
    let next = env.json(&["session", "next"]);
    assert_eq!(next["active_timers"].as_array().unwrap().len(), 0);
}

#[test]
fn cook_runs_through_piped_commands() {
    let env = env();
    env.cmd()
        .args(["cook", env.recipe.to_str().unwrap()])
        .write_stdin("n\nt\nn\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/3: Bring water to a boil"))
        .stdout(predicate::str::contains("Step 2/3 [06:30]: Boil the eggs"))
        .stdout(predicate::str::contains("step 2:"))
        .stdout(predicate::str::contains("All 3 steps done."));
}
