// SPDX-License-Identifier: MPL-2.0
//! Deferred delivery of single-id tombstones.
//!
//! The store never publishes a single-id dismissal synchronously. It asks a
//! [`FrameScheduler`] to run the publication "after the current render
//! pass", which lets regions finish a frame against pre-dismissal state.
//!
//! Two schedulers are provided:
//!
//! - [`FrameQueue`]: tasks wait until the host calls [`FrameQueue::run_frame`]
//! - [`TimerFallback`]: tasks run on a shared zero-delay timer thread, after
//!   the requesting call returned

use super::lock;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

/// A unit of work deferred to the next frame.
pub type FrameTask = Box<dyn FnOnce() + Send>;

/// Schedules work to run after the current render pass.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, task: FrameTask);
}

/// Frame scheduler driven explicitly by the host's frame loop.
#[derive(Clone, Default)]
pub struct FrameQueue {
    pending: Arc<Mutex<Vec<FrameTask>>>,
}

impl FrameQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every task queued before this call.
    ///
    /// Tasks queued while the frame runs wait for the next frame.
    /// Returns the number of tasks executed.
    pub fn run_frame(&self) -> usize {
        let tasks = std::mem::take(&mut *lock(&self.pending));
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    /// Number of tasks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, task: FrameTask) {
        lock(&self.pending).push(task);
    }
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Zero-delay scheduler used when no frame loop is injected.
///
/// Tasks are handed to one process-wide timer thread and run in request
/// order. The thread does not depend on an async runtime, so tombstones are
/// still delivered after a runtime that requested them shut down.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerFallback;

static TIMER_THREAD: OnceLock<Option<Sender<FrameTask>>> = OnceLock::new();

fn timer_thread() -> Option<&'static Sender<FrameTask>> {
    TIMER_THREAD
        .get_or_init(|| {
            let (sender, receiver) = mpsc::channel::<FrameTask>();
            let spawned = thread::Builder::new()
                .name("toastline-frame-timer".into())
                .spawn(move || {
                    for task in receiver {
                        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                            tracing::error!("deferred frame task panicked");
                        }
                    }
                });
            match spawned {
                Ok(_) => Some(sender),
                Err(err) => {
                    tracing::error!(%err, "failed to start frame timer thread");
                    None
                }
            }
        })
        .as_ref()
}

impl FrameScheduler for TimerFallback {
    fn request_frame(&self, task: FrameTask) {
        let Some(timer) = timer_thread() else {
            tracing::warn!("no frame timer thread, running frame task immediately");
            task();
            return;
        };
        if let Err(mpsc::SendError(task)) = timer.send(task) {
            tracing::warn!("frame timer thread stopped, running frame task immediately");
            task();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn frame_queue_defers_until_run() {
        let queue = FrameQueue::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        queue.request_frame(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.run_frame(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(queue.run_frame(), 0);
    }

    #[test]
    fn tasks_queued_during_a_frame_wait_for_the_next() {
        let queue = FrameQueue::new();
        let inner = queue.clone();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        queue.request_frame(Box::new(move || {
            inner.request_frame(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        queue.run_frame();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        queue.run_frame();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fallback_runs_tasks_on_the_timer_thread_in_order() {
        let (sender, receiver) = mpsc::channel();
        for n in 0..3 {
            let sender = sender.clone();
            TimerFallback.request_frame(Box::new(move || {
                let _ = sender.send((n, thread::current().id()));
            }));
        }

        let caller = thread::current().id();
        let delivered: Vec<_> = (0..3)
            .map(|_| receiver.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(
            delivered.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(delivered.iter().all(|(_, runner)| *runner != caller));
    }

    #[tokio::test]
    async fn fallback_does_not_depend_on_the_runtime() {
        let (sender, receiver) = mpsc::channel();
        TimerFallback.request_frame(Box::new(move || {
            let _ = sender.send(());
        }));
        assert!(receiver.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn panicking_task_does_not_stop_the_timer() {
        TimerFallback.request_frame(Box::new(|| panic!("task failed")));
        let (sender, receiver) = mpsc::channel();
        TimerFallback.request_frame(Box::new(move || {
            let _ = sender.send(());
        }));
        assert!(receiver.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
