//! Chat turn types as exchanged with the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Roles that count as conversation when building query context.
    pub fn is_conversational(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Request body of one chat turn.
///
/// Keys other than `messages` (model, stream flags, ...) are carried
/// through untouched so the host gets its body back intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatTurn {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            extra: Map::new(),
        }
    }

    /// The message being answered.
    pub fn question(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Render every message before the last one as `role: content` lines.
///
/// Only user and assistant messages are included. Returns `None` when
/// nothing qualifies.
pub fn build_context(messages: &[ChatMessage]) -> Option<String> {
    let (_, history) = messages.split_last()?;
    let lines: Vec<String> = history
        .iter()
        .filter(|msg| msg.role.is_conversational())
        .map(|msg| format!("{}: {}", msg.role, msg.content))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
