//! Single source of truth for the topic request lifecycle.
//!
//! The store holds the draft, the last successful result, and the request
//! status. Every mutation updates all of its fields under one lock and then
//! notifies listeners with the post-mutation snapshot.
//!
//! Snapshots are queued under the state lock and delivered by one thread at a
//! time, so listeners see them in mutation order even when mutations race
//! across threads. A mutation made while another thread is delivering returns
//! without waiting; that thread delivers it.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread,
};

use shared::protocol::TopicResult;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Stamp handed out by [`RequestStore::begin_request`]. Later requests get
/// strictly larger generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Read-only projection of the store at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub draft: String,
    pub status: RequestStatus,
    pub result: Option<Arc<TopicResult>>,
}

type Listener = Arc<dyn Fn(&StoreSnapshot) + Send + Sync>;

#[derive(Default)]
struct StoreState {
    draft: String,
    status: RequestStatus,
    result: Option<Arc<TopicResult>>,
    generation: Generation,
    pending: VecDeque<StoreSnapshot>,
    delivering: bool,
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            draft: self.draft.clone(),
            status: self.status,
            result: self.result.clone(),
        }
    }

    /// Queues the current snapshot. Returns true when the caller must deliver
    /// the queue because no other thread is doing so.
    fn enqueue_snapshot(&mut self) -> bool {
        let snapshot = self.snapshot();
        self.pending.push_back(snapshot);
        !std::mem::replace(&mut self.delivering, true)
    }
}

#[derive(Default)]
pub struct RequestStore {
    state: Mutex<StoreState>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener_id: AtomicU64,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|state| state.draft = text);
    }

    pub fn clear_draft(&self) {
        self.mutate(|state| state.draft.clear());
    }

    /// Marks a new request as in flight and returns its generation.
    ///
    /// No guard against re-entrancy: a request that is already loading is
    /// simply superseded.
    pub fn begin_request(&self) -> Generation {
        self.mutate(|state| {
            state.generation = Generation(state.generation.0 + 1);
            state.status = RequestStatus::Loading;
            debug!(generation = state.generation.0, "topic request started");
            state.generation
        })
    }

    pub fn complete_request(&self, result: TopicResult) {
        let result = Arc::new(result);
        self.mutate(|state| {
            state.status = RequestStatus::Succeeded;
            state.result = Some(result);
        });
    }

    /// Leaves the previously stored result in place.
    pub fn fail_request(&self) {
        self.mutate(|state| state.status = RequestStatus::Failed);
    }

    /// Applies `result` only if `generation` is the latest request. Returns
    /// whether the store changed.
    pub fn complete_request_for(&self, generation: Generation, result: TopicResult) -> bool {
        let result = Arc::new(result);
        self.mutate_if_current(generation, |state| {
            state.status = RequestStatus::Succeeded;
            state.result = Some(result);
        })
    }

    pub fn fail_request_for(&self, generation: Generation) -> bool {
        self.mutate_if_current(generation, |state| state.status = RequestStatus::Failed)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock_state().snapshot()
    }

    pub fn latest_generation(&self) -> Generation {
        self.lock_state().generation
    }

    /// Registers a listener that runs synchronously after every mutation.
    /// Listeners run in registration order, outside the store lock, and see
    /// snapshots in mutation order.
    pub fn subscribe(
        &self,
        listener: impl Fn(&StoreSnapshot) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn mutate<R>(&self, apply: impl FnOnce(&mut StoreState) -> R) -> R {
        let (output, deliver) = {
            let mut state = self.lock_state();
            let output = apply(&mut state);
            (output, state.enqueue_snapshot())
        };
        if deliver {
            self.deliver_pending();
        }
        output
    }

    fn mutate_if_current(
        &self,
        generation: Generation,
        apply: impl FnOnce(&mut StoreState),
    ) -> bool {
        let deliver = {
            let mut state = self.lock_state();
            if state.generation != generation {
                debug!(
                    generation = generation.0,
                    latest = state.generation.0,
                    "discarding stale topic resolution"
                );
                return false;
            }
            apply(&mut state);
            state.enqueue_snapshot()
        };
        if deliver {
            self.deliver_pending();
        }
        true
    }

    /// Drains the snapshot queue in order. Snapshots queued by listeners or by
    /// other threads while this runs are delivered before it returns.
    fn deliver_pending(&self) {
        let _reset = DeliveryReset(self);
        loop {
            let snapshot = {
                let mut state = self.lock_state();
                match state.pending.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        state.delivering = false;
                        return;
                    }
                }
            };
            self.notify(&snapshot);
        }
    }

    fn notify(&self, snapshot: &StoreSnapshot) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hands delivery back if a listener panics mid-drain, so later mutations
/// still notify.
struct DeliveryReset<'a>(&'a RequestStore);

impl Drop for DeliveryReset<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut state = self.0.lock_state();
            state.pending.clear();
            state.delivering = false;
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
