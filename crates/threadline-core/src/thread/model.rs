//! Thread domain model.
//!
//! A thread is one conversation: metadata plus an ordered, append-only
//! sequence of messages. The first message is supplied together with the
//! thread, so a thread is never observed with an empty sequence.

use super::message::Message;
use crate::error::{Result, ThreadlineError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation thread.
///
/// This is the "pure" domain model that the store operates on,
/// independent of the persisted snapshot format or its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique thread identifier
    pub id: String,
    /// Identifier of the user owning the thread
    pub user_id: String,
    /// Human-readable title
    pub title: String,
    /// Timestamp when the thread was created (ISO 8601 format)
    pub created_at: String,
    /// Messages in display order
    pub messages: Vec<Message>,
}

impl Thread {
    /// Starts a new thread from the user's first message.
    ///
    /// The thread gets a fresh id, its title is the message text, and its
    /// sequence holds exactly that one `user` message.
    pub fn start(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let content = content.into();
        let first = Message::user(id.clone(), content.clone());
        Self {
            created_at: first.created_at.clone(),
            id,
            user_id: user_id.into(),
            title: content,
            messages: vec![first],
        }
    }

    /// Returns a copy of this thread with `message` appended.
    pub fn with_message(&self, message: Message) -> Self {
        let mut next = self.clone();
        next.messages.push(message);
        next
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Checks the shape every stored thread must have: at least one
    /// message, each owned by this thread and carrying non-blank content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(ThreadlineError::invalid_input(format!(
                "Thread '{}' has no messages",
                self.id
            )));
        }
        for message in &self.messages {
            if message.thread_id != self.id {
                return Err(ThreadlineError::invalid_input(format!(
                    "Message '{}' of thread '{}' belongs to '{}'",
                    message.id, self.id, message.thread_id
                )));
            }
            if message.content.trim().is_empty() {
                return Err(ThreadlineError::invalid_input(format!(
                    "Message '{}' of thread '{}' is blank",
                    message.id, self.id
                )));
            }
        }
        Ok(())
    }
}

/// The persisted projection of the store: the thread collection only.
///
/// Loading and error flags are transient and never part of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub threads: Vec<Thread>,
}

impl ThreadSnapshot {
    pub fn new(threads: Vec<Thread>) -> Self {
        Self { threads }
    }
}
