use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

// Each test gets its own state directory and a scrubbed environment so the
// host machine's configuration never leaks into the run.
fn hook_cmd(state: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hookwarden"));
    cmd.current_dir(state)
        .env("HOOKWARDEN_STATE_DIR", state.join(".claude"))
        .env_remove("HOOKWARDEN_RULES_PATH")
        .env_remove("HOOKWARDEN_REQUIRED_ENV")
        .env_remove("SLACK_WEBHOOK_URL")
        .env_remove("NOTIFY_ALL")
        .env_remove("RUST_LOG");
    cmd
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_dangerous_command_denied_over_stdio() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "rm -rf /"},
        "session_id": "session-0001"
    });

    let output = hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .output()
        .unwrap();

    assert!(output.status.success());
    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        response,
        json!({
            "hookSpecificOutput": {
                "hookEventName": "PreToolUse",
                "permissionDecision": "deny",
                "permissionDecisionReason": "BLOCKED: matches dangerous pattern: unscoped recursive delete"
            }
        })
    );

    let audit = read_lines(&dir.path().join(".claude/audit.log"));
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0]["decision"]["decision"], "deny");
    assert_eq!(audit[0]["session_id"], "session-0001");

    let notifications =
        std::fs::read_to_string(dir.path().join(".claude/notifications.log")).unwrap();
    assert!(notifications.contains("[HIGH] security_block:"));
}

#[test]
fn test_numeric_session_id_still_gated() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "rm -rf /"},
        "session_id": 12345
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"permissionDecision\":\"deny\""));

    let audit = read_lines(&dir.path().join(".claude/audit.log"));
    assert_eq!(audit[0]["session_id"], "12345");
}

#[test]
fn test_oversized_shell_gate_fails_closed() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {
            "command": "rm -rf /",
            "description": "d".repeat(11 * 1024 * 1024)
        }
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "BLOCKED: payload too large to inspect",
        ));
}

#[test]
fn test_oversized_file_write_passes_silently() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Write",
        "tool_input": {
            "file_path": "big.txt",
            "content": "c".repeat(11 * 1024 * 1024)
        }
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_safe_command_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "npm install express"}
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_malformed_input_is_silent() {
    let dir = TempDir::new().unwrap();

    hook_cmd(dir.path())
        .write_stdin("this is not json")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    hook_cmd(dir.path())
        .write_stdin("[1, 2, 3]")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(!dir.path().join(".claude/audit.log").exists());
}

#[test]
fn test_post_action_audit_is_redacted() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PostToolUse",
        "tool_name": "Bash",
        "tool_input": {
            "command": "deploy",
            "env": {"DB_PASSWORD": "hunter2"},
            "notes": "n".repeat(500)
        },
        "tool_response": {"stdout": "ok"},
        "session_id": "abcdef123456"
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let raw = std::fs::read_to_string(dir.path().join(".claude/audit.log")).unwrap();
    assert!(!raw.contains("hunter2"));

    let audit = read_lines(&dir.path().join(".claude/audit.log"));
    assert_eq!(audit[0]["input"]["env"]["DB_PASSWORD"], "[REDACTED]");
    assert_eq!(audit[0]["input"]["notes"].as_str().unwrap().chars().count(), 214);
    assert_eq!(audit[0]["success"], true);

    let metrics = read_lines(&dir.path().join(".claude/metrics.jsonl"));
    assert_eq!(metrics[0]["tool"], "Bash");
    assert_eq!(metrics[0]["session_id"], "abcdef12");
    assert_eq!(metrics[0]["estimated_tokens"], 103);
}

#[test]
fn test_event_override_flag() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "tool_name": "Bash",
        "tool_input": {"command": "cat .env.production"}
    });

    hook_cmd(dir.path())
        .args(["hook", "--event", "pre-tool-use"])
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("references protected file: .env"));
}

#[test]
fn test_unreadable_command_denied() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": ["rm", "-rf", "/"]}
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"permissionDecision\":\"deny\""));
}

#[test]
fn test_session_stop_notifies() {
    let dir = TempDir::new().unwrap();
    let payload = json!({"hook_type": "Stop", "session_id": "feedface-0000"});

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let log = std::fs::read_to_string(dir.path().join(".claude/notifications.log")).unwrap();
    assert!(log.contains("[INFO] session_complete: Session completed: feedface..."));
}

#[test]
fn test_session_start_reports_missing_env() {
    let dir = TempDir::new().unwrap();
    let payload = json!({"hook_event_name": "SessionStart", "session_id": "s-start"});

    hook_cmd(dir.path())
        .env("HOOKWARDEN_REQUIRED_ENV", "HOOKWARDEN_TEST_SURELY_UNSET_VAR")
        .env_remove("HOOKWARDEN_TEST_SURELY_UNSET_VAR")
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[Session Init] Warnings: Missing env var: HOOKWARDEN_TEST_SURELY_UNSET_VAR",
        ));

    let session_log =
        std::fs::read_to_string(dir.path().join(".claude/memory/session_log.md")).unwrap();
    assert!(session_log.contains("## Session s-start"));
    assert!(session_log.contains("- X HOOKWARDEN_TEST_SURELY_UNSET_VAR: MISSING"));
}

#[test]
fn test_prompt_submit_injects_active_task() {
    let dir = TempDir::new().unwrap();
    let memory = dir.path().join(".claude/memory");
    std::fs::create_dir_all(&memory).unwrap();
    std::fs::write(
        memory.join("active_context.md"),
        "# Active\n## Current Task\nWire up the dispatcher\n",
    )
    .unwrap();

    hook_cmd(dir.path())
        .write_stdin(json!({"hook_event_name": "UserPromptSubmit", "prompt": "go"}).to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("[Context] "))
        .stdout(predicate::str::contains("Active: Wire up the dispatcher"));
}

#[test]
fn test_subagent_output_condensed() {
    let dir = TempDir::new().unwrap();
    let mut output = "filler line\n".repeat(400);
    output.push_str("## Summary\nDone\n");
    let payload = json!({
        "hook_event_name": "SubagentStop",
        "agent_name": "reviewer",
        "output": output
    });

    hook_cmd(dir.path())
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[SubagentStop] reviewer output condensed from 4816 to",
        ));
}

#[test]
fn test_custom_rules_file() {
    let dir = TempDir::new().unwrap();
    let rules = dir.path().join("rules.yaml");
    std::fs::write(&rules, "protected_files:\n  - \"secrets/prod.json\"\n").unwrap();
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "cat secrets/prod.json"}
    });

    hook_cmd(dir.path())
        .env("HOOKWARDEN_RULES_PATH", &rules)
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "BLOCKED: references protected file: secrets/prod.json",
        ));
}

#[test]
fn test_check_subcommand_exit_codes() {
    let dir = TempDir::new().unwrap();

    hook_cmd(dir.path())
        .args(["check", "git", "push", "--force", "origin", "main"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"decision\":\"deny\""));

    hook_cmd(dir.path())
        .args(["check", "ls", "-la"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"decision\":\"allow\""));
}

#[test]
fn test_validate_subcommand() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.yaml");
    std::fs::write(&good, "truncate_at: 120\n").unwrap();
    let bad = dir.path().join("bad.yaml");
    std::fs::write(
        &bad,
        "dangerous_patterns:\n  - id: broken\n    description: broken\n    pattern: \"rm (\"\n",
    )
    .unwrap();

    hook_cmd(dir.path())
        .args(["validate", "--rules"])
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule set OK"));

    hook_cmd(dir.path())
        .args(["validate", "--rules"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn test_metrics_subcommand() {
    let dir = TempDir::new().unwrap();
    for cmd in ["ls", "pwd"] {
        let payload = json!({
            "hook_event_name": "PostToolUse",
            "tool_name": "Bash",
            "tool_input": {"command": cmd},
            "session_id": "metrics-session"
        });
        hook_cmd(dir.path())
            .write_stdin(payload.to_string())
            .assert()
            .success();
    }

    hook_cmd(dir.path())
        .args(["metrics", "--week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Tool Calls:      2"))
        .stdout(predicate::str::contains("Unique Sessions:       1"));
}

#[test]
fn test_binary_help() {
    hook_cmd(Path::new("."))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("metrics"));
}
