//! Thread snapshot DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: `{ threads: [...] }` with the browser-era field names
//!   (`userId`, `createdAt`, `message` for the message list)

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use threadline_core::error::{Result, ThreadlineError};
use threadline_core::thread::{Message, MessageRole, Thread, ThreadSnapshot};

/// Entity name the snapshot migrator is registered under.
pub const THREAD_SNAPSHOT_ENTITY: &str = "thread_snapshot";

// ============================================================================
// Message DTOs
// ============================================================================

/// Message DTO V1.0.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV1_0_0 {
    pub id: String,
    pub thread_id: String,
    pub content: String,
    pub role: MessageRole,
    pub created_at: String,
}

impl From<&Message> for MessageV1_0_0 {
    fn from(message: &Message) -> Self {
        MessageV1_0_0 {
            id: message.id.clone(),
            thread_id: message.thread_id.clone(),
            content: message.content.clone(),
            role: message.role,
            created_at: message.created_at.clone(),
        }
    }
}

impl From<MessageV1_0_0> for Message {
    fn from(dto: MessageV1_0_0) -> Self {
        Message {
            id: dto.id,
            thread_id: dto.thread_id,
            content: dto.content,
            role: dto.role,
            created_at: dto.created_at,
        }
    }
}

// ============================================================================
// Thread DTOs
// ============================================================================

/// Thread DTO V1.0.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadV1_0_0 {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
    /// Messages in display order. Required: a thread always has at least one.
    #[serde(rename = "message")]
    pub messages: Vec<MessageV1_0_0>,
}

impl From<&Thread> for ThreadV1_0_0 {
    fn from(thread: &Thread) -> Self {
        ThreadV1_0_0 {
            id: thread.id.clone(),
            user_id: thread.user_id.clone(),
            title: thread.title.clone(),
            created_at: thread.created_at.clone(),
            messages: thread.messages.iter().map(Into::into).collect(),
        }
    }
}

impl From<ThreadV1_0_0> for Thread {
    fn from(dto: ThreadV1_0_0) -> Self {
        Thread {
            id: dto.id,
            user_id: dto.user_id,
            title: dto.title,
            created_at: dto.created_at,
            messages: dto.messages.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// ThreadSnapshot DTOs
// ============================================================================

/// Thread snapshot DTO V1.0.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ThreadSnapshotV1_0_0 {
    #[serde(default)]
    pub threads: Vec<ThreadV1_0_0>,
}

/// Convert ThreadSnapshotV1_0_0 DTO to domain model
impl IntoDomain<ThreadSnapshot> for ThreadSnapshotV1_0_0 {
    fn into_domain(self) -> ThreadSnapshot {
        ThreadSnapshot {
            threads: self.threads.into_iter().map(Into::into).collect(),
        }
    }
}

/// Convert domain model to ThreadSnapshotV1_0_0 DTO (for version-migrate save support)
impl FromDomain<ThreadSnapshot> for ThreadSnapshotV1_0_0 {
    fn from_domain(snapshot: ThreadSnapshot) -> Self {
        ThreadSnapshotV1_0_0 {
            threads: snapshot.threads.iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for ThreadSnapshot entities.
pub fn create_thread_snapshot_migrator() -> Result<version_migrate::Migrator> {
    version_migrate::migrator!("thread_snapshot" => [
        ThreadSnapshotV1_0_0,
        ThreadSnapshot
    ], save = true)
    .map_err(|e| {
        ThreadlineError::migration(format!("Failed to create thread_snapshot migrator: {}", e))
    })
}
