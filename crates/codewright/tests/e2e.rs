// End-to-end tests for the cwr binary.
// Everything here runs offline: no API keys, no network.

use std::fs;
use std::process::Command;

fn cwr() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cwr"))
}

#[test]
fn cli_help_displays_correctly() {
    let output = cwr().arg("--help").output().expect("failed to run cwr --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("codewright"));
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("session"));
    assert!(stdout.contains("upload"));
    assert!(stdout.contains("models"));
    assert!(stdout.contains("config"));
}

#[test]
fn ask_help_shows_options() {
    let output = cwr()
        .args(["ask", "--help"])
        .output()
        .expect("failed to run cwr ask --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--session"));
    assert!(stdout.contains("--model"));
    assert!(stdout.contains("--attach"));
    assert!(stdout.contains("--no-exec"));
}

#[test]
fn models_lists_all_four_families() {
    let output = cwr().arg("models").output().expect("failed to run cwr models");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gpt-4o-mini"));
    assert!(stdout.contains("gemini-1.5-flash"));
    assert!(stdout.contains("gemma2-9b-it"));
    assert!(stdout.contains("claude-3-5-sonnet-20240620"));
    assert!(stdout.contains("GROQ_API_KEY"));
}

#[test]
fn models_json_is_a_four_entry_array() {
    let output = cwr()
        .args(["models", "--format", "json"])
        .output()
        .expect("failed to run cwr models");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("models output is JSON");
    assert_eq!(value.as_array().map(Vec::len), Some(4));
    assert_eq!(value[0]["provider"], "openai");
}

#[test]
fn ask_rejects_unknown_model_before_anything_else() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = cwr()
        .args(["ask", "hi", "--model", "gpt-9000", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr ask");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown model 'gpt-9000'"));
    // Nothing was persisted for the failed interaction.
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn ask_without_api_key_names_the_variable() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = cwr()
        .args(["ask", "hi", "--model", "gpt-4o-mini", "--sessions-dir"])
        .arg(root.path())
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to run cwr ask");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OPENAI_API_KEY"));
}

#[test]
fn session_list_on_empty_root_succeeds() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = cwr()
        .args(["session", "list", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session list");

    assert!(output.status.success());
}

#[test]
fn session_show_reproduces_a_persisted_log() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = root.path().join("demo");
    fs::create_dir_all(&dir).unwrap();
    let history = serde_json::json!([
        {"role": "system", "content": "sys"},
        {"role": "user", "content": "run it"},
        {"role": "assistant", "content": "{\"code\":\"echo hi\",\"language\":\"sh\"}"},
        {"role": "env", "content": "hi\n"}
    ]);
    fs::write(
        dir.join("history.json"),
        serde_json::to_string_pretty(&history).unwrap(),
    )
    .unwrap();

    let output = cwr()
        .args(["session", "show", "--session", "demo", "--format", "json", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session show");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("show output is JSON");
    assert_eq!(value, history);
}

#[test]
fn session_show_tail_limits_messages() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = root.path().join("demo");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("history.json"),
        r#"[{"role":"system","content":"sys"},{"role":"user","content":"a"},{"role":"assistant","content":"b"}]"#,
    )
    .unwrap();

    let output = cwr()
        .args([
            "session", "show", "--session", "demo", "--tail", "1", "--format", "json",
            "--sessions-dir",
        ])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session show");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["role"], "assistant");
}

#[test]
fn session_show_rejects_traversal_names() {
    let root = tempfile::tempdir().expect("tempdir");
    let output = cwr()
        .args(["session", "show", "--session", "../outside", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session show");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid session name"));
}

#[test]
fn upload_then_delete_session() {
    let root = tempfile::tempdir().expect("tempdir");
    let src_dir = tempfile::tempdir().expect("tempdir");
    let src = src_dir.path().join("notes.txt");
    fs::write(&src, "hello").unwrap();

    let output = cwr()
        .arg("upload")
        .arg(&src)
        .args(["--session", "demo", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr upload");
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(root.path().join("demo").join("notes.txt")).unwrap(),
        "hello"
    );

    let output = cwr()
        .args(["session", "delete", "--session", "demo", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session delete");
    assert!(output.status.success());
    assert!(!root.path().join("demo").exists());

    // Deleting again reports the missing session.
    let output = cwr()
        .args(["session", "delete", "--session", "demo", "--sessions-dir"])
        .arg(root.path())
        .output()
        .expect("failed to run cwr session delete");
    assert!(!output.status.success());
}

#[test]
fn config_path_prints_a_location() {
    let output = cwr()
        .args(["config", "path"])
        .output()
        .expect("failed to run cwr config path");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("config.toml"));
}
