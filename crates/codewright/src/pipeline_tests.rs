use super::*;
use cwr_core::{CwrError, Role};
use cwr_llm::MockChatClient;

fn settings(dir: &tempfile::TempDir) -> ExecSettings {
    ExecSettings {
        workdir: dir.path().to_path_buf(),
        timeout: Some(Duration::from_secs(30)),
    }
}

fn seeded_transcript() -> Transcript {
    let mut transcript = Transcript::new("sys");
    transcript.push(Message::user("do the thing"));
    transcript
}

fn reply(code: &str) -> String {
    serde_json::json!({"code": code, "language": "sh"}).to_string()
}

#[tokio::test]
async fn test_first_attempt_success_is_one_model_call() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::always(reply("echo done"));
    let mut transcript = seeded_transcript();

    let outcome = run_interaction(&client, &mut transcript, &settings(&dir), 5, |_| {})
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(client.call_count(), 1);

    // sys, user, assistant, env — no repair prompt on success.
    assert_eq!(transcript.len(), 4);
    let roles: Vec<Role> = transcript.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Environment]
    );
    assert!(
        outcome
            .last_execution
            .as_ref()
            .unwrap()
            .output
            .contains("done")
    );
}

#[tokio::test]
async fn test_always_failing_snippet_exhausts_bound() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::always(reply("echo broken >&2; exit 3"));
    let mut transcript = seeded_transcript();

    let outcome = run_interaction(&client, &mut transcript, &settings(&dir), 5, |_| {})
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 5);
    assert_eq!(client.call_count(), 5);

    // sys, user, then five assistant/env/user-repair triples. The last
    // repair prompt is never answered.
    assert_eq!(transcript.len(), 2 + 5 * 3);
    let messages = transcript.messages();
    for attempt in 0..5 {
        let base = 2 + attempt * 3;
        assert_eq!(messages[base].role, Role::Assistant);
        assert_eq!(messages[base + 1].role, Role::Environment);
        assert_eq!(messages[base + 2].role, Role::User);
        // The repair prompt is the captured output, verbatim.
        assert_eq!(messages[base + 2].content, messages[base + 1].content);
    }
    assert_eq!(outcome.last_execution.as_ref().unwrap().exit_code, 3);
}

#[tokio::test]
async fn test_repair_succeeds_on_second_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::new(vec![reply("exit 1"), reply("echo fixed")]);
    let mut transcript = seeded_transcript();

    let mut reported = Vec::new();
    let outcome = run_interaction(&client, &mut transcript, &settings(&dir), 5, |r| {
        reported.push((r.attempt, r.execution.success));
    })
    .await
    .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(client.call_count(), 2);
    assert_eq!(reported, vec![(1, false), (2, true)]);

    // sys, user, (assistant, env, user-repair), (assistant, env)
    assert_eq!(transcript.len(), 7);
    assert_eq!(transcript.last().unwrap().role, Role::Environment);
    assert!(transcript.last().unwrap().content.as_text().contains("fixed"));
}

#[tokio::test]
async fn test_malformed_reply_aborts_but_keeps_assistant_message() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::always("I cannot write code today.".to_string());
    let mut transcript = seeded_transcript();

    let err = run_interaction(&client, &mut transcript, &settings(&dir), 5, |_| {})
        .await
        .unwrap_err();

    let typed = err.downcast_ref::<CwrError>().expect("typed error");
    assert!(matches!(typed, CwrError::MalformedReply { .. }));

    // The raw reply was recorded before parsing failed.
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.last().unwrap().role, Role::Assistant);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_unsupported_language_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::always(
        serde_json::json!({"code": "puts 1", "language": "ruby"}).to_string(),
    );
    let mut transcript = seeded_transcript();

    let err = run_interaction(&client, &mut transcript, &settings(&dir), 5, |_| {})
        .await
        .unwrap_err();
    let typed = err.downcast_ref::<CwrError>().expect("typed error");
    assert!(matches!(typed, CwrError::UnsupportedLanguage(_)));
}

#[tokio::test]
async fn test_zero_attempts_means_no_model_call() {
    let dir = tempfile::tempdir().unwrap();
    let client = MockChatClient::always(reply("echo hi"));
    let mut transcript = seeded_transcript();

    let outcome = run_interaction(&client, &mut transcript, &settings(&dir), 0, |_| {})
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 0);
    assert_eq!(client.call_count(), 0);
    assert_eq!(transcript.len(), 2);
}

#[tokio::test]
async fn test_chat_turn_appends_assistant_only() {
    let client = MockChatClient::always("plain prose reply".to_string());
    let mut transcript = seeded_transcript();

    let reply = run_chat_turn(&client, &mut transcript).await.unwrap();
    assert_eq!(reply, "plain prose reply");
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.last().unwrap().role, Role::Assistant);
}
