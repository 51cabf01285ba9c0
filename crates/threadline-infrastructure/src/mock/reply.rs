use async_trait::async_trait;
use std::time::Duration;
use threadline_core::error::Result;
use threadline_core::thread::{Message, ReplyService};

/// Canned assistant text returned by [`MockReplyService`].
pub const MOCK_REPLY_CONTENT: &str = "some random value generated from ai";

/// Reply service that answers every thread with the same text after a delay.
#[derive(Debug, Clone)]
pub struct MockReplyService {
    delay: Duration,
    content: String,
}

impl MockReplyService {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            content: MOCK_REPLY_CONTENT.to_string(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

#[async_trait]
impl ReplyService for MockReplyService {
    async fn reply(&self, thread_id: &str) -> Result<Message> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!("[MockReplyService] Replying on thread {}", thread_id);
        Ok(Message::assistant(thread_id, self.content.clone()))
    }
}
