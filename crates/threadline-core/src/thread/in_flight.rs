//! Per-thread guard for outstanding sends.
//!
//! At most one send may be waiting for a reply on a given thread. A second
//! attempt is rejected with [`ThreadlineError::SendInFlight`] rather than
//! queued. Each admitted send carries a cancellation token which the store
//! trips when the thread is removed or the session is reset, so a reply that
//! arrives afterwards is discarded instead of applied.
//!
//! Bulk loads are not exclusive; [`LoadGuard`] only counts them so the
//! store can tell whether anything is still outstanding.

use crate::error::{Result, ThreadlineError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

struct Slot {
    ticket: u64,
    token: CancellationToken,
}

/// Registry of threads that currently have a send awaiting its reply.
#[derive(Default)]
pub(crate) struct InFlightRegistry {
    slots: Mutex<HashMap<String, Slot>>,
    next_ticket: AtomicU64,
}

impl InFlightRegistry {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the slot for `thread_id`, failing if it is already taken.
    pub(crate) fn acquire(self: &Arc<Self>, thread_id: &str) -> Result<SendGuard> {
        let mut slots = self.slots();
        if slots.contains_key(thread_id) {
            return Err(ThreadlineError::SendInFlight {
                thread_id: thread_id.to_string(),
            });
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        slots.insert(
            thread_id.to_string(),
            Slot {
                ticket,
                token: token.clone(),
            },
        );

        Ok(SendGuard {
            thread_id: thread_id.to_string(),
            ticket,
            token,
            registry: Arc::clone(self),
        })
    }

    /// Cancels and frees the slot for `thread_id`, if any.
    pub(crate) fn cancel(&self, thread_id: &str) -> bool {
        match self.slots().remove(thread_id) {
            Some(slot) => {
                slot.token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) {
        for (_, slot) in self.slots().drain() {
            slot.token.cancel();
        }
    }

    pub(crate) fn contains(&self, thread_id: &str) -> bool {
        self.slots().contains_key(thread_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots().len()
    }

    fn release(&self, thread_id: &str, ticket: u64) {
        let mut slots = self.slots();
        // A cancelled slot may already have been replaced by a newer send.
        if slots.get(thread_id).is_some_and(|slot| slot.ticket == ticket) {
            slots.remove(thread_id);
        }
    }
}

/// Proof that the holder owns the single send slot of a thread.
///
/// Dropping the guard frees the slot.
pub struct SendGuard {
    thread_id: String,
    ticket: u64,
    token: CancellationToken,
    registry: Arc<InFlightRegistry>,
}

impl SendGuard {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Token tripped when the thread is removed or the session is reset.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl std::fmt::Debug for SendGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGuard")
            .field("thread_id", &self.thread_id)
            .field("ticket", &self.ticket)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.registry.release(&self.thread_id, self.ticket);
    }
}

/// One outstanding bulk load. Dropping the guard ends it.
#[derive(Debug)]
pub struct LoadGuard {
    counter: Arc<AtomicUsize>,
}

impl LoadGuard {
    pub(crate) fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected_until_release() {
        let registry = Arc::new(InFlightRegistry::default());

        let guard = registry.acquire("T1").unwrap();
        let err = registry.acquire("T1").unwrap_err();
        assert!(err.is_send_in_flight());

        // Other threads are independent
        let other = registry.acquire("T2").unwrap();
        assert_eq!(registry.len(), 2);

        drop(guard);
        assert!(!registry.contains("T1"));
        assert!(registry.acquire("T1").is_ok());
        drop(other);
    }

    #[test]
    fn test_cancel_trips_token_and_frees_slot() {
        let registry = Arc::new(InFlightRegistry::default());
        let guard = registry.acquire("T1").unwrap();

        assert!(registry.cancel("T1"));
        assert!(guard.is_cancelled());
        assert!(!registry.contains("T1"));
        assert!(!registry.cancel("T1"));
    }

    #[test]
    fn test_stale_guard_does_not_release_newer_slot() {
        let registry = Arc::new(InFlightRegistry::default());
        let stale = registry.acquire("T1").unwrap();
        registry.cancel("T1");

        let fresh = registry.acquire("T1").unwrap();
        drop(stale);

        assert!(registry.contains("T1"));
        assert!(!fresh.is_cancelled());
    }

    #[test]
    fn test_cancel_all() {
        let registry = Arc::new(InFlightRegistry::default());
        let a = registry.acquire("A").unwrap();
        let b = registry.acquire("B").unwrap();

        registry.cancel_all();

        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_load_guard_counts_until_dropped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = LoadGuard::new(Arc::clone(&counter));
        let second = LoadGuard::new(Arc::clone(&counter));
        assert_eq!(counter.load(Ordering::Acquire), 2);

        drop(first);
        assert_eq!(counter.load(Ordering::Acquire), 1);
        drop(second);
        assert_eq!(counter.load(Ordering::Acquire), 0);
    }
}
