//! Chat use case implementation.
//!
//! `ChatUseCase` drives the three asynchronous chat flows against the
//! [`ThreadStore`]:
//!
//! - bulk load at session start
//! - the optimistic send protocol (user message visible before the reply
//!   is awaited, reply appended to the current sequence when it lands)
//! - the delete request/confirm round trip

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use threadline_core::config::AppConfig;
use threadline_core::error::{Result, ThreadlineError};
use threadline_core::thread::{
    DeleteService, Message, ReplyService, SendGuard, Thread, ThreadSource, ThreadStore,
};

/// Error surfaced when the bulk load fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load threads";
/// Error surfaced when a delete targets an unknown thread.
pub const THREAD_NOT_FOUND_MESSAGE: &str = "error in finding thread";
/// Error surfaced when a delete is refused or fails.
pub const DELETE_FAILED_MESSAGE: &str = "Error in deleting chat";
/// Error surfaced when a reply cannot be obtained.
pub const REPLY_FAILED_MESSAGE: &str = "Failed to get a reply";

/// How a pending reply ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The reply was appended to its thread.
    Applied(Message),
    /// The thread was deleted or the session reset before the reply landed.
    Discarded,
}

/// Result of a confirmed deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Id of the removed thread
    pub thread_id: String,
    /// The removed thread was the open one; the view should go to "new thread"
    pub redirect_to_new_thread: bool,
}

/// Use case for the chat views.
///
/// Every awaited service call is bounded by the configured timeout, and no
/// flow leaves the store's loading flag set once its call has settled.
pub struct ChatUseCase {
    store: Arc<ThreadStore>,
    replies: Arc<dyn ReplyService>,
    deletions: Arc<dyn DeleteService>,
    source: Arc<dyn ThreadSource>,
    /// Owner stamped on threads created here
    user_id: String,
    timeout: Duration,
}

impl ChatUseCase {
    pub fn new(
        store: Arc<ThreadStore>,
        replies: Arc<dyn ReplyService>,
        deletions: Arc<dyn DeleteService>,
        source: Arc<dyn ThreadSource>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            replies,
            deletions,
            source,
            user_id: config.user_id.clone(),
            timeout: config.service_timeout(),
        }
    }

    pub fn store(&self) -> &Arc<ThreadStore> {
        &self.store
    }

    /// Replaces the collection with the threads from the source.
    ///
    /// Returns the number of threads loaded. On failure the previous
    /// collection (e.g. the restored snapshot) is kept and
    /// [`LOAD_FAILED_MESSAGE`] is surfaced.
    pub async fn load_threads(&self) -> Result<usize> {
        self.store.clear_error();
        let load = self.store.begin_load();

        let result = match bounded(self.timeout, "load threads", self.source.fetch_threads()).await
        {
            Ok(response) if response.success => {
                let count = response.data.len();
                self.store.replace_all(response.data);
                tracing::info!("[ChatUseCase] Loaded {} thread(s)", count);
                Ok(count)
            }
            Ok(response) => Err(ThreadlineError::service(response.message)),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!("[ChatUseCase] Failed to load threads: {}", e);
            self.store.set_error(Some(LOAD_FAILED_MESSAGE.to_string()));
        }
        drop(load);
        self.store.refresh_loading();
        result
    }

    /// Makes the user's message visible and starts waiting for the reply.
    ///
    /// When `current_thread_id` names a stored thread the message is
    /// appended to it; otherwise a new thread titled after the message is
    /// prepended. The returned [`PendingReply`] tells the caller which
    /// thread to show, and must be [settled](PendingReply::settle) to apply
    /// the reply.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or whitespace-only message
    /// - `SendInFlight` if the thread is still waiting on a previous reply
    ///
    /// The store is untouched in both cases.
    pub fn send_message(&self, current_thread_id: Option<&str>, text: &str) -> Result<PendingReply> {
        if text.trim().is_empty() {
            return Err(ThreadlineError::invalid_input("Message text is empty"));
        }

        let existing = current_thread_id.and_then(|id| self.store.find(id));
        let (guard, created) = match existing {
            Some(thread) => {
                let guard = self.store.begin_send(&thread.id)?;
                let message = Message::user(thread.id.clone(), text);
                if !self.store.append_message(&thread.id, message) {
                    return Err(ThreadlineError::not_found("Thread", thread.id));
                }
                tracing::debug!("[ChatUseCase] Sent message on thread {}", thread.id);
                (guard, false)
            }
            None => {
                if let Some(id) = current_thread_id {
                    tracing::debug!("[ChatUseCase] Unknown thread '{}', starting a new one", id);
                }
                let thread = Thread::start(self.user_id.clone(), text);
                let guard = self.store.begin_send(&thread.id)?;
                let thread_id = thread.id.clone();
                if !self.store.prepend(thread) {
                    return Err(ThreadlineError::invalid_input(format!(
                        "Thread '{}' was rejected by the store",
                        thread_id
                    )));
                }
                tracing::info!("[ChatUseCase] Started thread {}", thread_id);
                (guard, true)
            }
        };

        self.store.refresh_loading();

        Ok(PendingReply {
            store: Arc::clone(&self.store),
            replies: Arc::clone(&self.replies),
            timeout: self.timeout,
            guard,
            created,
        })
    }

    /// Sends a message and waits for its reply.
    pub async fn send_and_settle(
        &self,
        current_thread_id: Option<&str>,
        text: &str,
    ) -> Result<(String, ReplyOutcome)> {
        let pending = self.send_message(current_thread_id, text)?;
        let thread_id = pending.thread_id().to_string();
        let outcome = pending.settle().await?;
        Ok((thread_id, outcome))
    }

    /// Asks the delete service to remove a thread and applies its answer.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the thread is not in the store
    /// - the service error, or `Service` for a negative acknowledgement or
    ///   one that names a different thread
    ///
    /// In every error case the collection is unchanged and an error is
    /// surfaced on the store.
    pub async fn delete_thread(
        &self,
        thread_id: &str,
        current_thread_id: Option<&str>,
    ) -> Result<DeleteOutcome> {
        let Some(thread) = self.store.find(thread_id) else {
            self.store.set_error(Some(THREAD_NOT_FOUND_MESSAGE.to_string()));
            return Err(ThreadlineError::not_found("Thread", thread_id));
        };

        let result = bounded(
            self.timeout,
            "delete thread",
            self.deletions.delete_thread(&thread),
        )
        .await;

        match result {
            Ok(response) if response.success && response.data.id != thread_id => {
                tracing::warn!(
                    "[ChatUseCase] Delete of {} acknowledged for {}, ignoring",
                    thread_id,
                    response.data.id
                );
                self.store.set_error(Some(DELETE_FAILED_MESSAGE.to_string()));
                Err(ThreadlineError::service(format!(
                    "Delete of '{}' was acknowledged for '{}'",
                    thread_id, response.data.id
                )))
            }
            Ok(response) if response.success => {
                self.store.remove(thread_id);
                tracing::info!("[ChatUseCase] Deleted thread {}", thread_id);
                Ok(DeleteOutcome {
                    thread_id: thread_id.to_string(),
                    redirect_to_new_thread: current_thread_id == Some(thread_id),
                })
            }
            Ok(response) => {
                tracing::warn!(
                    "[ChatUseCase] Delete of {} refused: {}",
                    thread_id,
                    response.message
                );
                self.store.set_error(Some(DELETE_FAILED_MESSAGE.to_string()));
                Err(ThreadlineError::service(response.message))
            }
            Err(e) => {
                tracing::error!("[ChatUseCase] Delete of {} failed: {}", thread_id, e);
                self.store.set_error(Some(DELETE_FAILED_MESSAGE.to_string()));
                Err(e)
            }
        }
    }
}

/// A sent message whose reply has not been applied yet.
///
/// Holds the thread's send slot until settled or dropped. Dropping it
/// without settling abandons the reply.
pub struct PendingReply {
    store: Arc<ThreadStore>,
    replies: Arc<dyn ReplyService>,
    timeout: Duration,
    guard: SendGuard,
    created: bool,
}

impl PendingReply {
    /// Thread the message was sent on (the new one, if created).
    pub fn thread_id(&self) -> &str {
        self.guard.thread_id()
    }

    /// Whether sending created a new thread.
    pub fn created(&self) -> bool {
        self.created
    }

    /// Awaits the reply and appends it to the thread.
    ///
    /// The reply races against the thread's cancellation (deletion or
    /// session reset) and the timeout. On failure the error is surfaced on
    /// the store as well as returned.
    pub async fn settle(self) -> Result<ReplyOutcome> {
        let PendingReply {
            store,
            replies,
            timeout,
            guard,
            ..
        } = self;
        let thread_id = guard.thread_id().to_string();

        let result = tokio::select! {
            biased;
            _ = guard.cancellation().cancelled() => Ok(None),
            reply = bounded(timeout, "reply", replies.reply(&thread_id)) => reply.map(Some),
        };

        let outcome = match result {
            Ok(Some(reply)) if reply.thread_id != thread_id => Err(ThreadlineError::service(
                format!(
                    "Reply for thread '{}' arrived for '{}'",
                    thread_id, reply.thread_id
                ),
            )),
            Ok(Some(reply)) => {
                if !guard.is_cancelled() && store.append_message(&thread_id, reply.clone()) {
                    tracing::debug!("[PendingReply] Reply applied to thread {}", thread_id);
                    Ok(ReplyOutcome::Applied(reply))
                } else {
                    tracing::info!("[PendingReply] Discarded reply for gone thread {}", thread_id);
                    Ok(ReplyOutcome::Discarded)
                }
            }
            Ok(None) => {
                tracing::info!("[PendingReply] Send on thread {} was cancelled", thread_id);
                Ok(ReplyOutcome::Discarded)
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            tracing::error!("[PendingReply] Reply for thread {} failed: {}", thread_id, e);
            store.set_error(Some(REPLY_FAILED_MESSAGE.to_string()));
        }

        drop(guard);
        store.refresh_loading();
        outcome
    }
}

impl std::fmt::Debug for PendingReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReply")
            .field("thread_id", &self.thread_id())
            .field("created", &self.created)
            .finish()
    }
}

/// Runs `call` under `timeout`, mapping expiry to `ThreadlineError::Timeout`.
async fn bounded<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ThreadlineError::timeout(operation, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use threadline_core::api::ApiResponse;
    use threadline_core::thread::{MessageRole, SnapshotRepository, ThreadSnapshot};

    #[derive(Default)]
    struct NullSnapshots;

    impl SnapshotRepository for NullSnapshots {
        fn load(&self) -> Result<Option<ThreadSnapshot>> {
            Ok(None)
        }
        fn save(&self, _snapshot: &ThreadSnapshot) -> Result<()> {
            Ok(())
        }
        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    struct EchoReplies;

    #[async_trait]
    impl ReplyService for EchoReplies {
        async fn reply(&self, thread_id: &str) -> Result<Message> {
            Ok(Message::assistant(thread_id, "echo"))
        }
    }

    struct FailingReplies;

    #[async_trait]
    impl ReplyService for FailingReplies {
        async fn reply(&self, _thread_id: &str) -> Result<Message> {
            Err(ThreadlineError::service("model unavailable"))
        }
    }

    struct MisdirectedReplies;

    #[async_trait]
    impl ReplyService for MisdirectedReplies {
        async fn reply(&self, _thread_id: &str) -> Result<Message> {
            Ok(Message::assistant("somewhere-else", "lost"))
        }
    }

    #[derive(Default)]
    struct RecordingDeletes {
        requested: Mutex<Vec<String>>,
        refuse: bool,
    }

    #[async_trait]
    impl DeleteService for RecordingDeletes {
        async fn delete_thread(&self, thread: &Thread) -> Result<ApiResponse<Thread>> {
            self.requested.lock().unwrap().push(thread.id.clone());
            if self.refuse {
                Ok(ApiResponse::rejected(thread.clone(), "nope"))
            } else {
                Ok(ApiResponse::ok(thread.clone(), "Thread has been deleted"))
            }
        }
    }

    /// Acknowledges every delete as if it were for `echoed`.
    struct MismatchedDeletes {
        echoed: Thread,
    }

    #[async_trait]
    impl DeleteService for MismatchedDeletes {
        async fn delete_thread(&self, _thread: &Thread) -> Result<ApiResponse<Thread>> {
            Ok(ApiResponse::ok(self.echoed.clone(), "Thread has been deleted"))
        }
    }

    struct FixedSource(Option<Vec<Thread>>);

    #[async_trait]
    impl ThreadSource for FixedSource {
        async fn fetch_threads(&self) -> Result<ApiResponse<Vec<Thread>>> {
            match &self.0 {
                Some(threads) => Ok(ApiResponse::ok(threads.clone(), "ok")),
                None => Err(ThreadlineError::service("offline")),
            }
        }
    }

    fn usecase_with(
        replies: Arc<dyn ReplyService>,
        deletions: Arc<dyn DeleteService>,
        source: Arc<dyn ThreadSource>,
    ) -> ChatUseCase {
        let store = Arc::new(ThreadStore::new(Arc::new(NullSnapshots)));
        ChatUseCase::new(store, replies, deletions, source, &AppConfig::default())
    }

    fn usecase() -> ChatUseCase {
        usecase_with(
            Arc::new(EchoReplies),
            Arc::new(RecordingDeletes::default()),
            Arc::new(FixedSource(Some(Vec::new()))),
        )
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_without_mutation() {
        let chat = usecase();
        let err = chat.send_message(None, "   \n").unwrap_err();
        assert!(matches!(err, ThreadlineError::InvalidInput(_)));
        assert!(chat.store().is_empty());
        assert!(!chat.store().is_loading());
    }

    #[tokio::test]
    async fn test_user_message_visible_before_reply() {
        let chat = usecase();
        let pending = chat.send_message(None, "hello").unwrap();

        let thread = chat.store().find(pending.thread_id()).unwrap();
        assert!(pending.created());
        assert_eq!(thread.title, "hello");
        assert_eq!(thread.message_count(), 1);
        assert!(chat.store().is_loading());
        assert!(chat.store().is_awaiting_reply(pending.thread_id()));

        let thread_id = pending.thread_id().to_string();
        let outcome = pending.settle().await.unwrap();

        assert!(matches!(outcome, ReplyOutcome::Applied(ref m) if m.role == MessageRole::Assistant));
        assert_eq!(chat.store().find(&thread_id).unwrap().message_count(), 2);
        assert!(!chat.store().is_loading());
        assert!(!chat.store().is_awaiting_reply(&thread_id));
    }

    #[tokio::test]
    async fn test_unknown_current_thread_starts_new_thread() {
        let chat = usecase();
        let pending = chat.send_message(Some("missing"), "hi").unwrap();
        assert!(pending.created());
        assert_ne!(pending.thread_id(), "missing");
        assert_eq!(chat.store().threads()[0].id, pending.thread_id());
    }

    #[tokio::test]
    async fn test_reply_failure_sets_error_and_clears_loading() {
        let chat = usecase_with(
            Arc::new(FailingReplies),
            Arc::new(RecordingDeletes::default()),
            Arc::new(FixedSource(Some(Vec::new()))),
        );

        let pending = chat.send_message(None, "hi").unwrap();
        let thread_id = pending.thread_id().to_string();
        let err = pending.settle().await.unwrap_err();

        assert!(matches!(err, ThreadlineError::Service(_)));
        assert_eq!(chat.store().error().as_deref(), Some(REPLY_FAILED_MESSAGE));
        assert!(!chat.store().is_loading());
        // The user's message stays
        assert_eq!(chat.store().find(&thread_id).unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn test_misdirected_reply_is_not_applied() {
        let chat = usecase_with(
            Arc::new(MisdirectedReplies),
            Arc::new(RecordingDeletes::default()),
            Arc::new(FixedSource(Some(Vec::new()))),
        );

        let pending = chat.send_message(None, "hi").unwrap();
        let thread_id = pending.thread_id().to_string();
        assert!(pending.settle().await.is_err());
        assert_eq!(chat.store().find(&thread_id).unwrap().message_count(), 1);
        assert!(!chat.store().is_loading());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_collection() {
        let chat = usecase_with(
            Arc::new(EchoReplies),
            Arc::new(RecordingDeletes::default()),
            Arc::new(FixedSource(None)),
        );
        chat.store().prepend(Thread::start("u", "restored"));

        assert!(chat.load_threads().await.is_err());
        assert_eq!(chat.store().len(), 1);
        assert_eq!(chat.store().error().as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert!(!chat.store().is_loading());
    }

    #[tokio::test]
    async fn test_load_replaces_collection_and_clears_error() {
        let loaded = vec![Thread::start("u", "a"), Thread::start("u", "b")];
        let chat = usecase_with(
            Arc::new(EchoReplies),
            Arc::new(RecordingDeletes::default()),
            Arc::new(FixedSource(Some(loaded.clone()))),
        );
        chat.store().set_error(Some("old".to_string()));
        chat.store().prepend(Thread::start("u", "stale"));

        assert_eq!(chat.load_threads().await.unwrap(), 2);
        assert_eq!(chat.store().threads(), loaded);
        assert_eq!(chat.store().error(), None);
    }

    #[tokio::test]
    async fn test_delete_unknown_thread_does_not_call_service() {
        let deletes = Arc::new(RecordingDeletes::default());
        let chat = usecase_with(
            Arc::new(EchoReplies),
            deletes.clone(),
            Arc::new(FixedSource(Some(Vec::new()))),
        );

        let err = chat.delete_thread("ghost", None).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(chat.store().error().as_deref(), Some(THREAD_NOT_FOUND_MESSAGE));
        assert!(deletes.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refused_delete_leaves_store_unchanged() {
        let chat = usecase_with(
            Arc::new(EchoReplies),
            Arc::new(RecordingDeletes {
                refuse: true,
                ..Default::default()
            }),
            Arc::new(FixedSource(Some(Vec::new()))),
        );
        let thread = Thread::start("u", "keep me");
        chat.store().prepend(thread.clone());

        assert!(chat.delete_thread(&thread.id, Some(&thread.id)).await.is_err());
        assert_eq!(chat.store().threads(), vec![thread]);
        assert_eq!(chat.store().error().as_deref(), Some(DELETE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_delete_of_other_thread_does_not_redirect() {
        let chat = usecase();
        let open = Thread::start("u", "open");
        let other = Thread::start("u", "other");
        chat.store().replace_all(vec![open.clone(), other.clone()]);

        let outcome = chat.delete_thread(&other.id, Some(&open.id)).await.unwrap();
        assert!(!outcome.redirect_to_new_thread);
        assert_eq!(chat.store().threads(), vec![open]);
    }

    #[tokio::test]
    async fn test_delete_ack_for_other_thread_is_rejected() {
        let open = Thread::start("u", "open");
        let other = Thread::start("u", "other");
        let chat = usecase_with(
            Arc::new(EchoReplies),
            Arc::new(MismatchedDeletes {
                echoed: other.clone(),
            }),
            Arc::new(FixedSource(Some(Vec::new()))),
        );
        chat.store().replace_all(vec![open.clone(), other.clone()]);

        let err = chat.delete_thread(&open.id, Some(&open.id)).await.unwrap_err();

        assert!(matches!(err, ThreadlineError::Service(_)));
        assert_eq!(chat.store().threads(), vec![open, other]);
        assert_eq!(chat.store().error().as_deref(), Some(DELETE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_bounded_maps_expiry_to_timeout() {
        let err = bounded::<()>(
            Duration::from_millis(5),
            "reply",
            std::future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ThreadlineError::timeout("reply", Duration::from_millis(5)));
    }
}
