// SPDX-License-Identifier: MPL-2.0
//! Toast store: the single source of truth for toast identity and lifecycle.
//!
//! The store keeps an append-ordered history of [`Toast`] records, the set of
//! dismissed ids and the list of subscribers. Every mutation is applied before
//! the matching [`ToastEvent`] is published, and listeners are invoked outside
//! the store's locks so they may call back into it.
//!
//! Events are queued in mutation order while the state lock is held and are
//! delivered by a single draining caller at a time. Subscribers therefore see
//! events in the order the mutations happened, even across threads. A call
//! made while another thread is delivering returns once its event is queued.
//!
//! # Example
//!
//! ```
//! use toastline::store::{FrameQueue, Store};
//! use toastline::toast::ToastOptions;
//! use std::sync::Arc;
//!
//! let frames = FrameQueue::new();
//! let store = Store::with_scheduler(Arc::new(frames.clone()));
//!
//! let id = store.message("First toast", ToastOptions::new().id("stable-id"));
//! store.success("Updated toast", ToastOptions::new().id("stable-id"));
//! assert_eq!(store.get_history().len(), 1);
//!
//! store.dismiss(id);
//! assert!(store.get_active_toasts().is_empty());
//! frames.run_frame(); // tombstone delivered to subscribers
//! ```

mod promise;
mod scheduler;

pub use promise::{
    classify, Classification, ExtendedResult, Feedback, HttpResponse, HttpStatus, PromiseConfig,
    PromiseError, PromiseHandle, PromiseValue, SettledFn, Settlement, SuccessFn,
};
pub use scheduler::{FrameQueue, FrameScheduler, FrameTask, TimerFallback};

use crate::toast::{Content, Toast, ToastEvent, ToastId, ToastOptions, ToastType};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener = Arc<dyn Fn(&ToastEvent) + Send + Sync>;

/// Locks a mutex, recovering the data if a listener panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct State {
    counter: u64,
    toasts: Vec<Toast>,
    dismissed: HashSet<ToastId>,
}

impl State {
    fn next_id(&mut self) -> ToastId {
        let id = ToastId::Number(self.counter);
        self.counter += 1;
        id
    }
}

#[derive(Debug, Default)]
struct Outbox {
    queue: VecDeque<ToastEvent>,
    draining: bool,
}

/// Releases the drain turn if a listener unwinds mid-delivery.
struct DrainTurn<'a> {
    outbox: &'a Mutex<Outbox>,
    finished: bool,
}

impl Drop for DrainTurn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.outbox).draining = false;
        }
    }
}

// Lock order: state, then outbox, then subscribers.
struct Inner {
    state: Mutex<State>,
    outbox: Mutex<Outbox>,
    subscribers: Mutex<Vec<(u64, Listener)>>,
    next_subscriber: AtomicU64,
    scheduler: Arc<dyn FrameScheduler>,
}

impl Inner {
    /// Queues `events` behind everything already waiting for delivery.
    ///
    /// Callers hold the state lock so queue order matches mutation order.
    fn enqueue(&self, events: impl IntoIterator<Item = ToastEvent>) {
        lock(&self.outbox).queue.extend(events);
    }

    /// Delivers queued events unless another caller is already doing so.
    fn flush(&self) {
        {
            let mut outbox = lock(&self.outbox);
            if outbox.draining || outbox.queue.is_empty() {
                return;
            }
            outbox.draining = true;
        }

        let mut turn = DrainTurn {
            outbox: &self.outbox,
            finished: false,
        };
        loop {
            let next = {
                let mut outbox = lock(&self.outbox);
                let next = outbox.queue.pop_front();
                if next.is_none() {
                    outbox.draining = false;
                    turn.finished = true;
                }
                next
            };
            match next {
                Some(event) => self.deliver(&event),
                None => return,
            }
        }
    }

    fn deliver(&self, event: &ToastEvent) {
        let listeners: Vec<Listener> = lock(&self.subscribers)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Subscriber-based toast store.
///
/// Cloning is cheap and every clone addresses the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Creates a store that delivers tombstones through [`TimerFallback`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_scheduler(Arc::new(TimerFallback))
    }

    /// Creates a store that defers tombstones through `scheduler`.
    #[must_use]
    pub fn with_scheduler(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    counter: 1,
                    toasts: Vec::new(),
                    dismissed: HashSet::new(),
                }),
                outbox: Mutex::new(Outbox::default()),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                scheduler,
            }),
        }
    }

    /// Registers a listener for every toast and tombstone event.
    ///
    /// Listeners are called in registration order. The listener stays
    /// registered until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ToastEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).push((id, Arc::new(listener)));
        tracing::debug!(subscriber = id, "store subscriber attached");
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Creates a toast, or merges into the existing toast with the same id.
    ///
    /// A missing or empty id allocates the next counter value. Creating with
    /// a dismissed id makes it active again.
    pub fn create(&self, mut options: ToastOptions) -> ToastId {
        let mut state = lock(&self.inner.state);
        let id = match options.id.take() {
            Some(id) if !id.is_empty() => id,
            _ => state.next_id(),
        };

        state.dismissed.remove(&id);

        let record = match state.toasts.iter_mut().find(|toast| toast.id == id) {
            Some(existing) => {
                existing.apply(options);
                existing.clone()
            }
            None => {
                let toast = Toast::from_options(id.clone(), options);
                state.toasts.push(toast.clone());
                toast
            }
        };
        tracing::debug!(%id, toast_type = %record.toast_type, "toast upserted");
        self.inner.enqueue([ToastEvent::Upsert(record)]);
        drop(state);

        self.inner.flush();
        id
    }

    /// Marks `id` dismissed and publishes its tombstone on the next frame.
    pub fn dismiss(&self, id: impl Into<ToastId>) -> ToastId {
        let id = id.into();
        lock(&self.inner.state).dismissed.insert(id.clone());
        tracing::debug!(%id, "toast dismissed");

        let store = Arc::downgrade(&self.inner);
        let tombstone = id.clone();
        self.inner.scheduler.request_frame(Box::new(move || {
            if let Some(inner) = store.upgrade() {
                {
                    let _state = lock(&inner.state);
                    inner.enqueue([ToastEvent::Dismiss { id: tombstone }]);
                }
                inner.flush();
            }
        }));
        id
    }

    /// Publishes a tombstone for every toast in history, synchronously.
    ///
    /// The dismissed set is left untouched: regions react to each tombstone.
    pub fn dismiss_all(&self) {
        {
            let state = lock(&self.inner.state);
            tracing::debug!(count = state.toasts.len(), "dismissing all toasts");
            self.inner.enqueue(
                state
                    .toasts
                    .iter()
                    .map(|toast| ToastEvent::Dismiss { id: toast.id.clone() }),
            );
        }
        self.inner.flush();
    }

    /// History without dismissed toasts, in creation order.
    #[must_use]
    pub fn get_active_toasts(&self) -> Vec<Toast> {
        let state = lock(&self.inner.state);
        state
            .toasts
            .iter()
            .filter(|toast| !state.dismissed.contains(&toast.id))
            .cloned()
            .collect()
    }

    /// Full creation-ordered history, dismissed toasts included.
    #[must_use]
    pub fn get_history(&self) -> Vec<Toast> {
        lock(&self.inner.state).toasts.clone()
    }

    /// Returns true when `id` is in the dismissed set.
    #[must_use]
    pub fn is_dismissed(&self, id: &ToastId) -> bool {
        lock(&self.inner.state).dismissed.contains(id)
    }

    /// Allocates the next numeric id without creating a toast.
    pub fn create_id(&self) -> ToastId {
        lock(&self.inner.state).next_id()
    }

    /// Clears history and the dismissed set.
    ///
    /// Subscribers and the id counter are kept, so ids are never reused.
    pub fn reset(&self) {
        let mut state = lock(&self.inner.state);
        state.toasts.clear();
        state.dismissed.clear();
        tracing::debug!("store reset");
    }

    // =========================================================================
    // Typed Shorthands
    // =========================================================================

    /// Creates a toast keeping the type from `options` (normal by default).
    pub fn message(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.create(options.title(title))
    }

    pub fn success(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(ToastType::Success, title, options)
    }

    pub fn info(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(ToastType::Info, title, options)
    }

    pub fn warning(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(ToastType::Warning, title, options)
    }

    pub fn error(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(ToastType::Error, title, options)
    }

    pub fn loading(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(ToastType::Loading, title, options)
    }

    /// Creates a toast whose body is produced by the caller from its id.
    ///
    /// The produced content is stored in `custom`; the title is left as given.
    pub fn custom<F>(&self, producer: F, mut options: ToastOptions) -> ToastId
    where
        F: FnOnce(&ToastId) -> Content,
    {
        let id = match options.id.take() {
            Some(id) if !id.is_empty() => id,
            _ => self.create_id(),
        };
        let content = producer(&id);
        self.create(options.id(id).custom(content))
    }

    fn typed(&self, toast_type: ToastType, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.create(options.title(title).toast_type(toast_type))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Store")
            .field("toasts", &state.toasts.len())
            .field("dismissed", &state.dismissed.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`Store::subscribe`]. Detaches the listener when dropped.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Detaches the listener.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.subscribers).retain(|(id, _)| *id != self.id);
            tracing::debug!(subscriber = self.id, "store subscriber detached");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
