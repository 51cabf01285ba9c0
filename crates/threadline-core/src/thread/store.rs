use super::in_flight::{InFlightRegistry, LoadGuard, SendGuard};
use super::message::Message;
use super::model::{Thread, ThreadSnapshot};
use super::repository::SnapshotRepository;
use crate::error::Result;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Observable state of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Threads, most recently created first
    pub threads: Vec<Thread>,
    /// Whether an asynchronous operation is outstanding
    pub is_loading: bool,
    /// Last error surfaced to the user
    pub error: Option<String>,
}

/// Single source of truth for conversation threads.
///
/// `ThreadStore` is responsible for:
/// - Holding the ordered thread collection and the transient loading/error flags
/// - Applying mutations synchronously (no operation suspends)
/// - Saving the collection through the injected [`SnapshotRepository`] after
///   every mutation, and restoring it on construction
/// - Admitting at most one outstanding send per thread (see [`SendGuard`])
///
/// Thread ids are unique within the collection after every operation, and
/// every stored thread passes [`Thread::validate`].
pub struct ThreadStore {
    state: RwLock<StoreState>,
    snapshots: Arc<dyn SnapshotRepository>,
    in_flight: Arc<InFlightRegistry>,
    loads: Arc<AtomicUsize>,
}

impl ThreadStore {
    /// Creates a store and restores the last persisted snapshot.
    ///
    /// A missing snapshot yields an empty collection. A malformed one is
    /// logged and also yields an empty collection; it is never fatal.
    /// Restored threads that fail validation are dropped.
    pub fn new(snapshots: Arc<dyn SnapshotRepository>) -> Self {
        let threads = match snapshots.load() {
            Ok(Some(snapshot)) => {
                tracing::debug!(
                    "[ThreadStore] Restored {} thread(s) from snapshot",
                    snapshot.threads.len()
                );
                dedup_by_id(retain_valid(snapshot.threads))
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("[ThreadStore] Ignoring unreadable snapshot: {}", e);
                Vec::new()
            }
        };

        Self {
            state: RwLock::new(StoreState {
                threads,
                ..StoreState::default()
            }),
            snapshots,
            in_flight: Arc::new(InFlightRegistry::default()),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves the collection. Called with the write lock held so snapshots
    /// are written in mutation order.
    fn persist(&self, threads: &[Thread]) {
        let snapshot = ThreadSnapshot::new(threads.to_vec());
        if let Err(e) = self.snapshots.save(&snapshot) {
            tracing::warn!("[ThreadStore] Failed to save snapshot: {}", e);
        }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Returns a copy of the whole observable state.
    pub fn state(&self) -> StoreState {
        self.read().clone()
    }

    /// Returns a copy of the thread collection in display order.
    pub fn threads(&self) -> Vec<Thread> {
        self.read().threads.clone()
    }

    /// Looks up a thread by id.
    pub fn find(&self, thread_id: &str) -> Option<Thread> {
        self.read()
            .threads
            .iter()
            .find(|t| t.id == thread_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read().threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().threads.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    // ============================================================================
    // Collection mutations
    // ============================================================================

    /// Replaces the whole collection and clears any prior error.
    ///
    /// The caller's order is kept. Should the input repeat an id, only its
    /// first occurrence survives; invalid threads are dropped.
    pub fn replace_all(&self, threads: Vec<Thread>) {
        let mut state = self.write();
        state.threads = dedup_by_id(retain_valid(threads));
        state.error = None;
        tracing::debug!(
            "[ThreadStore] replace_all: {} thread(s)",
            state.threads.len()
        );
        self.persist(&state.threads);
    }

    /// Inserts a thread at the head of the collection.
    ///
    /// If a thread with the same id already exists it is dropped in favour
    /// of the new one (last write wins, no merge). Returns `false` and
    /// leaves the collection untouched when `thread` fails validation.
    pub fn prepend(&self, thread: Thread) -> bool {
        if let Err(e) = thread.validate() {
            tracing::warn!("[ThreadStore] prepend rejected: {}", e);
            return false;
        }

        let mut state = self.write();
        let before = state.threads.len();
        state.threads.retain(|t| t.id != thread.id);
        if state.threads.len() != before {
            tracing::warn!(
                "[ThreadStore] prepend replaced existing thread '{}'",
                thread.id
            );
        }
        tracing::debug!("[ThreadStore] prepend: {}", thread.id);
        state.threads.insert(0, thread);
        self.persist(&state.threads);
        true
    }

    /// Replaces the thread with the same id, keeping its position.
    ///
    /// Returns `false` and leaves the collection untouched when no such
    /// thread exists or `thread` fails validation.
    pub fn update(&self, thread: Thread) -> bool {
        if let Err(e) = thread.validate() {
            tracing::warn!("[ThreadStore] update rejected: {}", e);
            return false;
        }

        let mut state = self.write();
        let Some(slot) = state.threads.iter_mut().find(|t| t.id == thread.id) else {
            tracing::debug!("[ThreadStore] update ignored, unknown thread '{}'", thread.id);
            return false;
        };
        *slot = thread;
        self.persist(&state.threads);
        true
    }

    /// Appends one message to the current sequence of a thread.
    ///
    /// Unlike [`update`](Self::update) this is computed against the stored
    /// sequence, so messages appended in the meantime are kept. Returns
    /// `false` if the thread is gone, the message belongs elsewhere or its
    /// content is blank.
    pub fn append_message(&self, thread_id: &str, message: Message) -> bool {
        if message.content.trim().is_empty() {
            tracing::warn!("[ThreadStore] blank message '{}' rejected", message.id);
            return false;
        }
        if message.thread_id != thread_id {
            tracing::warn!(
                "[ThreadStore] message '{}' belongs to '{}', not '{}'",
                message.id,
                message.thread_id,
                thread_id
            );
            return false;
        }

        let mut state = self.write();
        let Some(thread) = state.threads.iter_mut().find(|t| t.id == thread_id) else {
            tracing::debug!("[ThreadStore] append ignored, unknown thread '{}'", thread_id);
            return false;
        };
        thread.messages.push(message);
        self.persist(&state.threads);
        true
    }

    /// Removes a thread and cancels any send still waiting on it.
    pub fn remove(&self, thread_id: &str) -> Option<Thread> {
        if self.in_flight.cancel(thread_id) {
            tracing::info!(
                "[ThreadStore] Cancelled pending reply for removed thread '{}'",
                thread_id
            );
        }

        let mut state = self.write();
        let index = state.threads.iter().position(|t| t.id == thread_id)?;
        let removed = state.threads.remove(index);
        tracing::debug!("[ThreadStore] remove: {}", thread_id);
        self.persist(&state.threads);
        Some(removed)
    }

    // ============================================================================
    // Transient state
    // ============================================================================

    pub fn set_loading(&self, is_loading: bool) {
        self.write().is_loading = is_loading;
    }

    /// Recomputes the loading flag from the outstanding loads and sends.
    pub fn refresh_loading(&self) {
        let busy = self.loads_in_flight() > 0 || self.pending_sends() > 0;
        self.set_loading(busy);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write().error = error;
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Clears threads and transient state, cancelling every pending send.
    ///
    /// The persisted snapshot is left alone; retention is the caller's call.
    pub fn reset_session(&self) {
        self.in_flight.cancel_all();
        let mut state = self.write();
        *state = StoreState::default();
        tracing::info!("[ThreadStore] Session state reset");
    }

    // ============================================================================
    // Send guard
    // ============================================================================

    /// Claims the single outstanding-send slot of a thread.
    ///
    /// # Errors
    ///
    /// Returns `SendInFlight` if a send on this thread is still waiting
    /// for its reply.
    pub fn begin_send(&self, thread_id: &str) -> Result<SendGuard> {
        self.in_flight.acquire(thread_id)
    }

    pub fn is_awaiting_reply(&self, thread_id: &str) -> bool {
        self.in_flight.contains(thread_id)
    }

    /// Number of sends currently waiting for a reply, across all threads.
    pub fn pending_sends(&self) -> usize {
        self.in_flight.len()
    }

    // ============================================================================
    // Load tracking
    // ============================================================================

    /// Registers an outstanding bulk load and raises the loading flag.
    ///
    /// The load counts as outstanding until the guard is dropped; call
    /// [`refresh_loading`](Self::refresh_loading) afterwards.
    pub fn begin_load(&self) -> LoadGuard {
        let guard = LoadGuard::new(Arc::clone(&self.loads));
        self.set_loading(true);
        guard
    }

    pub fn loads_in_flight(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }
}

fn retain_valid(threads: Vec<Thread>) -> Vec<Thread> {
    threads
        .into_iter()
        .filter(|t| match t.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[ThreadStore] Dropped invalid thread: {}", e);
                false
            }
        })
        .collect()
}

fn dedup_by_id(threads: Vec<Thread>) -> Vec<Thread> {
    let mut seen = HashSet::new();
    let total = threads.len();
    let unique: Vec<Thread> = threads
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();
    if unique.len() != total {
        tracing::warn!(
            "[ThreadStore] Dropped {} thread(s) with duplicate ids",
            total - unique.len()
        );
    }
    unique
}
