// SPDX-License-Identifier: MPL-2.0
//! Headless projection of the store, for hosts rendering toasts themselves.

use super::Inbox;
use crate::store::{Store, Subscription};
use crate::toast::{Toast, ToastEvent, ToastId};

/// Live list of every toast in a store, newest first.
///
/// Unlike a [`Toaster`](super::Toaster) it has no region filter, timers or
/// gestures: records are merged as they arrive and a tombstone removes its
/// toast on the frame after the one that received it.
pub struct ToastFeed {
    inbox: Inbox,
    subscription: Option<Subscription>,
    deferred: Vec<ToastId>,
    toasts: Vec<Toast>,
}

impl ToastFeed {
    #[must_use]
    pub fn new(store: &Store) -> Self {
        let (inbox, subscription) = Inbox::attach(store);
        Self {
            inbox,
            subscription: Some(subscription),
            deferred: Vec::new(),
            toasts: Vec::new(),
        }
    }

    /// Applies events queued since the previous frame.
    pub fn tick(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        self.toasts.retain(|toast| !deferred.contains(&toast.id));

        for event in self.inbox.drain() {
            match event {
                ToastEvent::Upsert(toast) => {
                    match self.toasts.iter_mut().find(|existing| existing.id == toast.id) {
                        Some(existing) => *existing = toast,
                        None => self.toasts.insert(0, toast),
                    }
                }
                ToastEvent::Dismiss { id } => self.deferred.push(id),
            }
        }
    }

    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Stops receiving store events.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl std::fmt::Debug for ToastFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastFeed")
            .field("toasts", &self.toasts.len())
            .field("attached", &self.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frame_store;
    use crate::toast::{ToastOptions, ToastType};

    #[test]
    fn merges_updates_and_removes_after_tombstone() {
        let (frames, store) = frame_store();
        let mut feed = ToastFeed::new(&store);

        let first = store.message("one", ToastOptions::new());
        let second = store.message("two", ToastOptions::new().toaster_id("elsewhere"));
        store.success("one again", ToastOptions::new().id(first.clone()));
        feed.tick();

        let ids: Vec<&ToastId> = feed.toasts().iter().map(|toast| &toast.id).collect();
        assert_eq!(ids, vec![&second, &first]);
        assert_eq!(feed.toasts()[1].toast_type, ToastType::Success);

        store.dismiss(first.clone());
        frames.run_frame();
        feed.tick();
        assert_eq!(feed.toasts().len(), 2);
        feed.tick();
        assert_eq!(feed.toasts().len(), 1);
    }

    #[test]
    fn detach_stops_updates() {
        let (_, store) = frame_store();
        let mut feed = ToastFeed::new(&store);
        feed.detach();
        store.message("unseen", ToastOptions::new());
        feed.tick();
        assert!(feed.toasts().is_empty());
        assert_eq!(store.subscriber_count(), 0);
    }
}
