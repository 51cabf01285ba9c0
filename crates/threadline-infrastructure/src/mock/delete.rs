use async_trait::async_trait;
use std::time::Duration;
use threadline_core::api::ApiResponse;
use threadline_core::error::Result;
use threadline_core::thread::{DeleteService, Thread};

/// Delete service that echoes the thread back after a delay.
#[derive(Debug, Clone)]
pub struct MockDeleteService {
    delay: Duration,
    acknowledge: bool,
}

impl MockDeleteService {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            acknowledge: true,
        }
    }

    /// A service that answers every request with `success = false`.
    pub fn refusing(delay: Duration) -> Self {
        Self {
            delay,
            acknowledge: false,
        }
    }
}

#[async_trait]
impl DeleteService for MockDeleteService {
    async fn delete_thread(&self, thread: &Thread) -> Result<ApiResponse<Thread>> {
        tokio::time::sleep(self.delay).await;
        if self.acknowledge {
            Ok(ApiResponse::ok(thread.clone(), "Thread has been deleted"))
        } else {
            Ok(ApiResponse::rejected(thread.clone(), "Thread could not be deleted"))
        }
    }
}
