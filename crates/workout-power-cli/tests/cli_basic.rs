//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary data directory and a
//! temporary config directory, and verify outputs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

struct Sandbox {
    data: TempDir,
    config: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let data = tempfile::tempdir().unwrap();
        std::fs::write(
            data.path().join("index.json"),
            r#"[
                {"filename": "quick.json", "name": "Quick", "description": "Two moves"},
                {"filename": "empty.json", "name": "Empty"}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            data.path().join("quick.json"),
            r#"{
                "name": "Quick",
                "exercises": [
                    {"name": "Squats", "durationSeconds": 1, "formTips": "Knees out"},
                    {"name": "Plank", "durationSeconds": 1}
                ],
                "defaultWorkSeconds": 20
            }"#,
        )
        .unwrap();
        std::fs::write(
            data.path().join("empty.json"),
            r#"{"name": "Empty", "exercises": []}"#,
        )
        .unwrap();
        Self {
            data,
            config: tempfile::tempdir().unwrap(),
        }
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        run_cli(self.data.path(), self.config.path(), args)
    }
}

fn run_cli(data: &Path, config: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_workout-power"))
        .arg("--data-dir")
        .arg(data)
        .args(args)
        .env("WORKOUT_POWER_CONFIG_DIR", config)
        .env("WORKOUT_POWER_REDUCED_MOTION", "1")
        .env_remove("WORKOUT_POWER_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_workouts_list() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["workouts", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("quick.json"));
    assert!(stdout.contains("Quick - Two moves"));
}

#[test]
fn test_workouts_list_json() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["workouts", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    assert_eq!(parsed[0]["filename"], "quick.json");
}

#[test]
fn test_workouts_preview_uses_settings() {
    let sandbox = Sandbox::new();
    let (_, _, code) = sandbox.run(&["settings", "set", "rest_duration", "4"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = sandbox.run(&["workouts", "preview", "quick.json"]);
    assert_eq!(code, 0);
    // 5 s prepare + 2 s work + one 4 s rest.
    assert!(stdout.contains("Est. 0:11"), "{stdout}");
    assert!(stdout.contains("1. Squats (1s)"));
    assert!(stdout.contains("Knees out"));
    assert!(stdout.contains("Rest 4s"));
}

#[test]
fn test_missing_workout_fails() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["workouts", "preview", "nope.json"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error: "), "{stderr}");
}

#[test]
fn test_run_empty_workout() {
    let sandbox = Sandbox::new();
    let (stdout, stderr, code) = sandbox.run(&["run", "empty.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: No workout loaded."), "{stderr}");
    assert!(stdout.is_empty());
}

#[test]
fn test_run_prints_events() {
    let sandbox = Sandbox::new();
    for (key, value) in [
        ("pre_workout_seconds", "3"),
        ("rest_duration", "0"),
        ("celebrations", "false"),
        ("sounds", "false"),
    ] {
        let (_, _, code) = sandbox.run(&["settings", "set", key, value]);
        assert_eq!(code, 0, "setting {key}");
    }

    let (stdout, _, code) = sandbox.run(&["run", "quick.json", "--events"]);
    assert_eq!(code, 0);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.first().unwrap()["type"], "WorkoutStarted");
    assert_eq!(events.first().unwrap()["estimated_total_secs"], 5);
    assert_eq!(events.last().unwrap()["type"], "WorkoutCompleted");
    let phases: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "PhaseEntered")
        .filter_map(|e| e["phase"].as_str())
        .collect();
    assert_eq!(phases, vec!["prepare", "work", "work"]);
}

#[test]
fn test_settings_roundtrip() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["settings", "get", "rest_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (stdout, _, code) = sandbox.run(&["settings", "set", "voice_volume", "40"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");
    let (stdout, _, _) = sandbox.run(&["settings", "get", "voice_volume"]);
    assert_eq!(stdout.trim(), "40");

    let (stdout, _, code) = sandbox.run(&["settings", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["voice_volume"], 40);

    let (_, _, code) = sandbox.run(&["settings", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = sandbox.run(&["settings", "get", "voice_volume"]);
    assert_eq!(stdout.trim(), "100");
}

#[test]
fn test_settings_rejects_bad_input() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["settings", "get", "volume"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown settings key: volume"));

    let (_, _, code) = sandbox.run(&["settings", "set", "sounds", "loud"]);
    assert_eq!(code, 1);
}

#[test]
fn test_celebrate_under_reduced_motion() {
    let sandbox = Sandbox::new();
    let (stdout, _, code) = sandbox.run(&["celebrate", "--seed", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("reduced motion"));
}
