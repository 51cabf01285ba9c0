//! Asynchronous back-end capabilities the chat flow depends on.
//!
//! Each trait has a single method so the send/delete/load protocols can be
//! exercised against fakes with deterministic timing.

use super::message::Message;
use super::model::Thread;
use crate::api::ApiResponse;
use crate::error::Result;
use async_trait::async_trait;

/// Produces the assistant reply for a thread.
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Returns a message with role `assistant` whose `thread_id` is `thread_id`.
    async fn reply(&self, thread_id: &str) -> Result<Message>;
}

/// Acknowledges (or refuses) deletion of a thread.
#[async_trait]
pub trait DeleteService: Send + Sync {
    async fn delete_thread(&self, thread: &Thread) -> Result<ApiResponse<Thread>>;
}

/// Bulk source of the user's threads, fetched at session start.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    async fn fetch_threads(&self) -> Result<ApiResponse<Vec<Thread>>>;
}
