//! End-to-end pipe behavior against a mock RAG server.

use mockito::{Matcher, Server, ServerGuard};
use ragpipe_core::{AppResult, PipeConfig, ResponseFlavor};
use ragpipe_pipe::{
    ChatMessage, ChatTurn, EventEmitter, InvocationContext, PipeEvent, PipeOutcome, RagPipe,
    StatusLevel, StatusUpdate, NO_MESSAGES,
};
use serde_json::json;
use std::sync::Mutex;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<StatusUpdate>>,
}

impl Recorder {
    fn updates(&self) -> Vec<StatusUpdate> {
        self.events.lock().unwrap().clone()
    }

    fn descriptions(&self) -> Vec<String> {
        self.updates().into_iter().map(|u| u.description).collect()
    }
}

#[async_trait::async_trait]
impl EventEmitter for Recorder {
    async fn emit(&self, event: PipeEvent) -> AppResult<()> {
        let PipeEvent::Status(update) = event;
        self.events.lock().unwrap().push(update);
        Ok(())
    }
}

fn pipe_for(server: &ServerGuard, flavor: ResponseFlavor) -> RagPipe {
    RagPipe::new(PipeConfig {
        server_url: server.url(),
        flavor,
        ..Default::default()
    })
    .unwrap()
}

async fn mock_reply(server: &mut ServerGuard, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", "/api/query")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_system_trace_answer_without_log() {
    let mut server = Server::new_async().await;
    let mock = mock_reply(&mut server, 200, r#"{"answer": "X"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let recorder = Recorder::default();
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe
        .pipe(&mut turn, Some(&recorder), &InvocationContext::new())
        .await;

    assert_eq!(outcome, PipeOutcome::Answer("X".to_string()));
    assert_eq!(
        turn.messages,
        vec![ChatMessage::user("Q"), ChatMessage::assistant("X")]
    );
    assert_eq!(
        recorder.descriptions(),
        vec!["Querying intelligent RAG server...", "Complete"]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_system_trace_answer_with_log() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"answer": "X", "log": "Y"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    assert_eq!(outcome.answer(), Some("X"));
    assert_eq!(
        turn.messages[1..],
        [
            ChatMessage::system("Thinking process:\nY"),
            ChatMessage::assistant("X"),
        ]
    );
}

#[tokio::test]
async fn test_inline_reasoning_answer_without_log() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"answer": "X"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::InlineReasoning);
    let recorder = Recorder::default();
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe
        .pipe(&mut turn, Some(&recorder), &InvocationContext::new())
        .await;

    assert_eq!(outcome.answer(), Some("X"));
    assert_eq!(turn.messages.last(), Some(&ChatMessage::assistant("X")));
    assert_eq!(turn.messages.len(), 2);
    // "Processing query..." falls inside the default 2s window.
    assert_eq!(
        recorder.descriptions(),
        vec!["Calling Intelligent RAG Server...", "Response generated successfully"]
    );
}

#[tokio::test]
async fn test_inline_reasoning_answer_with_log() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"answer": "X", "log": "Y"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::InlineReasoning);
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    let combined = "X\n\n```json\nReasoning:\n\"Y\"\n```";
    assert_eq!(outcome, PipeOutcome::Answer(combined.to_string()));
    assert_eq!(
        turn.messages,
        vec![ChatMessage::user("Q"), ChatMessage::assistant(combined)]
    );
}

#[tokio::test]
async fn test_server_error_for_both_flavors() {
    for flavor in [ResponseFlavor::SystemTrace, ResponseFlavor::InlineReasoning] {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/query")
            .with_status(500)
            .with_body("server error")
            .create_async()
            .await;
        let pipe = pipe_for(&server, flavor);
        let recorder = Recorder::default();
        let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

        let outcome = pipe
            .pipe(&mut turn, Some(&recorder), &InvocationContext::new())
            .await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "Error during RAG query: Error: 500 - server error"})
        );
        assert_eq!(turn.messages, vec![ChatMessage::user("Q")]);

        let last = recorder.updates().pop().unwrap();
        assert_eq!(last.level, StatusLevel::Error);
        assert!(last.done);
        assert_eq!(
            last.description,
            "Error during RAG query: Error: 500 - server error"
        );
    }
}

#[tokio::test]
async fn test_missing_answer_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"log": "Y"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    let message = outcome.error_message().unwrap();
    assert!(message.starts_with("Error during RAG query: "));
    assert!(message.contains("answer"));
    assert_eq!(turn.messages.len(), 1);
}

#[tokio::test]
async fn test_malformed_json_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, "{not json").await;
    let pipe = pipe_for(&server, ResponseFlavor::InlineReasoning);
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    assert!(outcome.is_error());
    assert_eq!(turn.messages.len(), 1);
}

#[tokio::test]
async fn test_empty_turn_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .expect(0)
        .create_async()
        .await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let recorder = Recorder::default();
    let mut turn = ChatTurn::default();

    let outcome = pipe
        .pipe(&mut turn, Some(&recorder), &InvocationContext::new())
        .await;

    assert_eq!(outcome, PipeOutcome::error(NO_MESSAGES));
    assert_eq!(turn.messages, vec![ChatMessage::assistant(NO_MESSAGES)]);
    let last = recorder.updates().pop().unwrap();
    assert_eq!(last.level, StatusLevel::Error);
    assert_eq!(last.description, NO_MESSAGES);
    assert!(last.done);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_system_trace_payload_has_no_context() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "projectId": "default",
            "query": "latest question",
            "thinkingDepth": 2
        })))
        .with_status(200)
        .with_body(r#"{"answer": "ok"}"#)
        .create_async()
        .await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let mut turn = ChatTurn::new(vec![
        ChatMessage::user("earlier"),
        ChatMessage::assistant("reply"),
        ChatMessage::user("latest question"),
    ]);

    let outcome = pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    assert_eq!(outcome.answer(), Some("ok"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_inline_reasoning_payload_carries_context() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Json(json!({
            "projectId": "handbook",
            "query": "and then?",
            "thinkingDepth": 4,
            "context": "user: first\nassistant: second"
        })))
        .with_status(200)
        .with_body(r#"{"answer": "ok"}"#)
        .create_async()
        .await;
    let pipe = RagPipe::new(PipeConfig {
        server_url: server.url(),
        project_id: "handbook".to_string(),
        thinking_depth: 4,
        flavor: ResponseFlavor::InlineReasoning,
        ..Default::default()
    })
    .unwrap();
    let mut turn = ChatTurn::new(vec![
        ChatMessage::system("house rules"),
        ChatMessage::user("first"),
        ChatMessage::assistant("second"),
        ChatMessage::user("and then?"),
    ]);

    let context = InvocationContext::new()
        .with_chat_id("chat-1")
        .with_message_id("msg-9");
    let outcome = pipe.pipe(&mut turn, None, &context).await;

    assert_eq!(outcome.answer(), Some("ok"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_inline_reasoning_single_message_sends_null_context() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/query")
        .match_body(Matcher::Json(json!({
            "projectId": "default",
            "query": "only",
            "thinkingDepth": 2,
            "context": null
        })))
        .with_status(200)
        .with_body(r#"{"answer": "ok"}"#)
        .create_async()
        .await;
    let pipe = pipe_for(&server, ResponseFlavor::InlineReasoning);
    let mut turn = ChatTurn::new(vec![ChatMessage::user("only")]);

    pipe.pipe(&mut turn, None, &InvocationContext::new()).await;

    mock.assert_async().await;
}

#[tokio::test]
async fn test_disabled_indicator_emits_nothing() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 500, "down").await;
    let pipe = RagPipe::new(PipeConfig {
        server_url: server.url(),
        enable_status_indicator: false,
        ..Default::default()
    })
    .unwrap();
    let recorder = Recorder::default();
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    pipe.pipe(&mut turn, Some(&recorder), &InvocationContext::new())
        .await;
    pipe.pipe(&mut ChatTurn::default(), Some(&recorder), &InvocationContext::new())
        .await;

    assert!(recorder.updates().is_empty());
}

#[tokio::test]
async fn test_zero_interval_shows_dispatch_status() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"answer": "X"}"#).await;
    let pipe = RagPipe::new(PipeConfig {
        server_url: server.url(),
        emit_interval: 0.0,
        flavor: ResponseFlavor::InlineReasoning,
        ..Default::default()
    })
    .unwrap();
    let recorder = Recorder::default();
    let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);

    pipe.pipe(&mut turn, Some(&recorder), &InvocationContext::new())
        .await;

    let updates = recorder.updates();
    assert_eq!(
        updates.iter().map(|u| u.description.as_str()).collect::<Vec<_>>(),
        vec![
            "Calling Intelligent RAG Server...",
            "Processing query...",
            "Response generated successfully"
        ]
    );
    assert!(!updates[0].done && !updates[1].done && updates[2].done);
}

#[tokio::test]
async fn test_throttle_spans_invocations() {
    let mut server = Server::new_async().await;
    let _mock = mock_reply(&mut server, 200, r#"{"answer": "X"}"#).await;
    let pipe = pipe_for(&server, ResponseFlavor::SystemTrace);
    let recorder = Recorder::default();

    for _ in 0..2 {
        let mut turn = ChatTurn::new(vec![ChatMessage::user("Q")]);
        pipe.pipe(&mut turn, Some(&recorder), &InvocationContext::new())
            .await;
    }

    // The second start event lands right after the first "Complete".
    assert_eq!(
        recorder.descriptions(),
        vec!["Querying intelligent RAG server...", "Complete", "Complete"]
    );
}
