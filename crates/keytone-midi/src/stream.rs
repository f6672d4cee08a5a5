//! Synchronous multicast event streams.
//!
//! An [`EventStream`] is a shared handle to a list of subscribers. Emitting
//! calls every current subscriber in subscription order, on the emitting
//! thread, before `emit` returns. Nothing is buffered: a subscriber added
//! after an emission never sees it.

use crate::event::NoteEvent;
use parking_lot::Mutex;
use std::sync::Arc;

/// Identifies one subscription on one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&NoteEvent) + Send>;

#[derive(Default)]
struct StreamState {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
    completed: bool,
    /// Ids of the subscribers `emit` currently has checked out.
    checked_out: Vec<SubscriptionId>,
    /// Checked-out subscribers that were unsubscribed mid-emission.
    removed: Vec<SubscriptionId>,
}

/// Cloneable handle to a stream. Clones share subscribers.
#[derive(Clone, Default)]
pub struct EventStream {
    state: Arc<Mutex<StreamState>>,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventStream")
            .field("subscribers", &state.subscribers.len())
            .field("completed", &state.completed)
            .finish()
    }
}

impl EventStream {
    /// A new, open stream with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future emission.
    ///
    /// On a completed stream the callback is dropped immediately and the
    /// returned id refers to nothing.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&NoteEvent) + Send + 'static,
    {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        if !state.completed {
            state.subscribers.push((id, Box::new(callback)));
        }
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    ///
    /// Safe to call from inside a callback, including for the callback's own
    /// subscription; a removed subscriber is not called again.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        if let Some(pos) = state.subscribers.iter().position(|(sid, _)| *sid == id) {
            state.subscribers.remove(pos);
            return true;
        }
        if state.checked_out.contains(&id) && !state.removed.contains(&id) {
            state.removed.push(id);
            return true;
        }
        false
    }

    /// Deliver an event to every current subscriber. No-op once completed.
    ///
    /// The lock is not held while callbacks run, so a callback may subscribe
    /// to or unsubscribe from this same stream. Subscribers added during an
    /// emission first receive the next one. A nested `emit` on the same stream
    /// only reaches subscribers that are not already running.
    pub fn emit(&self, event: &NoteEvent) {
        let mut active = {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            let active = std::mem::take(&mut state.subscribers);
            state.checked_out.extend(active.iter().map(|(id, _)| *id));
            active
        };

        for (id, callback) in &mut active {
            if self.is_removed(*id) {
                continue;
            }
            callback(event);
        }

        let mut state = self.state.lock();
        state
            .checked_out
            .retain(|id| !active.iter().any(|(sid, _)| sid == id));
        let removed: Vec<SubscriptionId> = state
            .removed
            .iter()
            .copied()
            .filter(|id| active.iter().any(|(sid, _)| sid == id))
            .collect();
        state.removed.retain(|id| !removed.contains(id));
        if state.completed {
            return;
        }
        active.retain(|(id, _)| !removed.contains(id));
        // subscribers added during emission go after the existing ones
        active.append(&mut state.subscribers);
        state.subscribers = active;
    }

    fn is_removed(&self, id: SubscriptionId) -> bool {
        let state = self.state.lock();
        state.completed || state.removed.contains(&id)
    }

    /// Complete the stream: drop every subscriber and ignore later emissions
    /// and subscriptions.
    pub fn complete(&self) {
        let dropped = {
            let mut state = self.state.lock();
            state.completed = true;
            std::mem::take(&mut state.subscribers)
        };
        // callbacks may own other handles; drop them outside the lock
        drop(dropped);
    }

    /// Whether [`complete`](Self::complete) has been called.
    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// True if both handles refer to the same stream.
    pub fn same_stream(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}
