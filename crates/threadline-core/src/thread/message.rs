//! Conversation message types.
//!
//! Messages are immutable once created: a thread only ever grows by
//! appending new messages to its tail.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply produced by the reply service.
    Assistant,
}

/// A single turn in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, unique within its thread (UUID when generated locally)
    pub id: String,
    /// Identifier of the thread that contains this message
    pub thread_id: String,
    /// Message text
    pub content: String,
    /// Author of the message
    pub role: MessageRole,
    /// Timestamp when the message was created (ISO 8601 format)
    pub created_at: String,
}

impl Message {
    /// Builds a message with a fresh client-side id and the current timestamp.
    pub fn new(thread_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            content: content.into(),
            role,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Builds an outgoing user message.
    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::User, content)
    }

    /// Builds an assistant reply.
    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
