//! Writing the server's reply back into the conversation.

use crate::chat::ChatMessage;
use ragpipe_client::QueryResponse;
use ragpipe_core::ResponseFlavor;
use serde_json::Value;

/// Append the reply to `messages` per `flavor` and return the answer text
/// handed back to the host.
pub fn apply_response(
    flavor: ResponseFlavor,
    response: QueryResponse,
    messages: &mut Vec<ChatMessage>,
) -> String {
    match flavor {
        ResponseFlavor::SystemTrace => {
            if let Some(log) = response.log.as_ref().filter(|log| is_meaningful(log)) {
                messages.push(ChatMessage::system(format!(
                    "Thinking process:\n{}",
                    log_text(log)
                )));
            }
            messages.push(ChatMessage::assistant(response.answer.clone()));
            response.answer
        }
        ResponseFlavor::InlineReasoning => {
            let combined = match &response.log {
                Some(log) => format!(
                    "{}\n\n```json\nReasoning:\n{}\n```",
                    response.answer,
                    pretty(log)
                ),
                None => response.answer,
            };
            messages.push(ChatMessage::assistant(combined.clone()));
            combined
        }
    }
}

/// Empty logs (null, "", [], {}, false, 0) do not produce a trace message.
fn is_meaningful(log: &Value) -> bool {
    match log {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Strings are shown verbatim, structured logs as indented JSON.
fn log_text(log: &Value) -> String {
    match log {
        Value::String(s) => s.clone(),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
