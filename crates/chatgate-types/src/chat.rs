//! Chat conversation and history types for chatgate.
//!
//! A chat call carries an ordered conversation of [`ChatMessage`]s; the
//! completed call is recorded as one append-only [`ChatExchange`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

pub use crate::llm::MessageRole;
use crate::llm::Usage;

/// Default `max_tokens` when the caller does not supply one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature when the caller does not supply one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default number of exchanges returned by a history listing.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// A single message in a caller-supplied conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// A chat request: the conversation plus generation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Explicit system prompt overriding the deployment default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Content of the most recent user-role message, scanning from the end.
    ///
    /// Returns an empty string when the conversation has no user message.
    pub fn last_user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Whether the conversation itself already carries a system-role message.
    pub fn has_system_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == MessageRole::System)
    }
}

/// The buffered answer to a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub message: String,
    pub usage: Option<Usage>,
    pub timestamp: DateTime<Utc>,
}

/// An exchange about to be appended to the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChatExchange {
    pub username: String,
    pub user_message: String,
    pub assistant_message: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted exchange. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub id: i64,
    #[serde(skip_serializing)]
    pub username: String,
    pub user_message: String,
    pub assistant_message: String,
    pub created_at: DateTime<Utc>,
}

/// Items yielded to the consumer of a streaming chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStreamEvent {
    /// An incremental piece of assistant text.
    Fragment(String),
    /// No further fragments will arrive.
    Done,
}

/// Lifecycle of a single streaming chat call.
///
/// `Pending -> Dispatched -> Streaming -> Completed` on success;
/// `Dispatched -> Failed` or `Streaming -> Failed` on provider error or
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatCallState {
    Pending,
    Dispatched,
    Streaming,
    Completed,
    Failed,
}

impl ChatCallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChatCallState::Completed | ChatCallState::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ChatCallState) -> bool {
        use ChatCallState::*;
        matches!(
            (self, next),
            (Pending, Dispatched)
                | (Dispatched, Streaming)
                | (Dispatched, Failed)
                | (Streaming, Streaming)
                | (Streaming, Completed)
                | (Streaming, Failed)
        )
    }
}

impl fmt::Display for ChatCallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatCallState::Pending => write!(f, "pending"),
            ChatCallState::Dispatched => write!(f, "dispatched"),
            ChatCallState::Streaming => write!(f, "streaming"),
            ChatCallState::Completed => write!(f, "completed"),
            ChatCallState::Failed => write!(f, "failed"),
        }
    }
}
