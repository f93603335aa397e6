// SPDX-License-Identifier: MPL-2.0
//! Shared helpers for unit tests.

pub use approx::assert_abs_diff_eq;

use crate::store::{FrameQueue, Store};
use std::sync::Arc;

/// A store whose tombstones are delivered when the returned queue runs a frame.
pub fn frame_store() -> (FrameQueue, Store) {
    let frames = FrameQueue::new();
    let store = Store::with_scheduler(Arc::new(frames.clone()));
    (frames, store)
}
