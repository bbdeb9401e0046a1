//! State-change listeners.
//!
//! Listeners are called outside every session lock, one snapshot at a time,
//! in registration order.  A panicking listener is logged and skipped; the
//! remaining listeners still see the snapshot.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::state::SessionState;

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl ListenerSet {
    pub(crate) fn add(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().push((id, listener));
        Subscription {
            id,
            set: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Deliver one snapshot to every listener registered right now.
    pub(crate) fn notify(&self, state: &SessionState) {
        // Snapshot the list so listeners may (un)subscribe while running.
        let listeners: Vec<(u64, Listener)> = self.entries.lock().clone();
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(state))).is_err() {
                tracing::error!(
                    listener = id,
                    state = state.name(),
                    "state listener panicked"
                );
            }
        }
    }
}

/// Handle returned by `on_state_change`.
///
/// Dropping it keeps the listener registered; call [`Subscription::unsubscribe`]
/// to stop notifications.
#[derive(Debug)]
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    id: u64,
    set: Weak<ListenerSet>,
}

impl Subscription {
    /// Deregister the listener.  Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.set.upgrade().is_some_and(|set| set.remove(self.id))
    }
}
