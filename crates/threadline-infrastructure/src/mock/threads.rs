use async_trait::async_trait;
use std::time::Duration;
use threadline_core::api::ApiResponse;
use threadline_core::config::DEFAULT_USER_ID;
use threadline_core::error::Result;
use threadline_core::thread::{Message, MessageRole, Thread, ThreadSource};

/// Thread source returning a fixed list after a delay.
#[derive(Debug, Clone)]
pub struct MockThreadSource {
    delay: Duration,
    threads: Vec<Thread>,
}

impl MockThreadSource {
    pub fn new(delay: Duration, threads: Vec<Thread>) -> Self {
        Self { delay, threads }
    }

    /// A source serving [`seed_threads`].
    pub fn seeded(delay: Duration) -> Self {
        Self::new(delay, seed_threads())
    }
}

#[async_trait]
impl ThreadSource for MockThreadSource {
    async fn fetch_threads(&self) -> Result<ApiResponse<Vec<Thread>>> {
        tokio::time::sleep(self.delay).await;
        let mut response = ApiResponse::ok(self.threads.clone(), "Threads retrieved successfully");
        response.count = Some(self.threads.len());
        Ok(response)
    }
}

fn message(id: &str, thread_id: &str, role: MessageRole, content: &str, at: &str) -> Message {
    Message {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        content: content.to_string(),
        role,
        created_at: at.to_string(),
    }
}

fn thread(id: &str, title: &str, at: &str, turns: &[(&str, MessageRole, &str, &str)]) -> Thread {
    Thread {
        id: id.to_string(),
        user_id: DEFAULT_USER_ID.to_string(),
        title: title.to_string(),
        created_at: at.to_string(),
        messages: turns
            .iter()
            .map(|(mid, role, content, mat)| message(mid, id, *role, content, mat))
            .collect(),
    }
}

/// The demo conversations served at session start.
pub fn seed_threads() -> Vec<Thread> {
    use MessageRole::{Assistant, User};

    vec![
        thread(
            "cmd4srqyf0007oo8fxkcgcj3q",
            "India: Ten Word Description",
            "2025-07-15T17:19:29.079Z",
            &[
                (
                    "cmd4srqyf0008oo8ftgd8fh15",
                    User,
                    "10 words description about india",
                    "2025-07-15T17:19:29.079Z",
                ),
                (
                    "cmd4srqyf0009oo8fu10x0g6x",
                    Assistant,
                    "Diverse, vibrant, spiritual, historical, populous, flavorful, colorful, cultural, technological, and beautiful.\n",
                    "2025-07-15T17:19:29.079Z",
                ),
            ],
        ),
        thread(
            "cmckmcdem0011oozpr0po8kml",
            "Samsung: A 10 message",
            "2025-07-01T14:24:10.462Z",
            &[
                (
                    "cmckmcdem0012oozpg5yqc776",
                    User,
                    "Explain about samusung company in 10 words",
                    "2025-07-01T14:24:10.462Z",
                ),
                (
                    "cmckmcdem0013oozphxjeyiuc",
                    Assistant,
                    "Samsung: South Korean multinational conglomerate specializing in electronics, technology, and construction.\n",
                    "2025-07-01T14:24:10.462Z",
                ),
                (
                    "cmckn8nzx001boozpbsx75olx",
                    User,
                    "what are thier latest 2 products",
                    "2025-07-01T14:49:17.179Z",
                ),
                (
                    "cmckn8qgq001doozpqjugy1jp",
                    Assistant,
                    "As of November 2023, two of Samsung's latest prominent products are:\n\n1.  **Samsung Galaxy S23 FE (Fan Edition):** A more affordable version of the flagship S23 series, offering many of the key features at a lower price point.\n2.  **Samsung Bespoke AI Laundry Combo:** A smart washer and dryer combo with AI-powered features for optimized laundry cycles.\n\nIt's worth noting that product releases are frequent, so there might be newer products depending on when you're asking.\n",
                    "2025-07-01T14:49:20.378Z",
                ),
                (
                    "cmcknjesj001foozpjc8go8qb",
                    User,
                    "where are they based",
                    "2025-07-01T14:57:38.465Z",
                ),
                (
                    "cmcknjgeb001hoozpdxj83zok",
                    Assistant,
                    "Samsung is based in **Seoul, South Korea**.\n",
                    "2025-07-01T14:57:40.548Z",
                ),
                (
                    "cmcknjnbt001joozpa8fcb8k4",
                    User,
                    "who is the founder",
                    "2025-07-01T14:57:49.529Z",
                ),
                (
                    "cmcknjowb001loozpu6f194oq",
                    Assistant,
                    "The founder of Samsung is **Lee Byung-chul**.\n",
                    "2025-07-01T14:57:51.563Z",
                ),
            ],
        ),
        thread(
            "cmclhkpd8001tooczzy0cst1e",
            "Kerala: Ten Word Description",
            "2025-07-02T04:58:27.306Z",
            &[
                (
                    "cmcneyais002ioocz2ov5hcep",
                    User,
                    "tell me about kerala in 10 words",
                    "2025-07-03T13:20:34.756Z",
                ),
                (
                    "cmcneyais002joocz0xuv8uya",
                    Assistant,
                    "Kerala: Lush greenery, beautiful beaches, backwaters, and vibrant culture.\n",
                    "2025-07-03T13:20:34.756Z",
                ),
            ],
        ),
    ]
}
