// SPDX-License-Identifier: MPL-2.0
//! Toast data model.
//!
//! This module provides the records exchanged between the store and the
//! toaster regions:
//!
//! - [`ToastId`]: Store-allocated or caller-chosen identity
//! - [`Toast`]: The canonical record held in store history
//! - [`ToastOptions`]: Caller input merged into records
//! - [`ToastEvent`]: Upserts and tombstones published to subscribers

mod content;
mod id;
mod record;

pub use content::{Action, ActionSlot, ClickEvent, Content};
pub use id::ToastId;
pub use record::{
    Position, Style, SwipeDirection, Toast, ToastCallback, ToastEvent, ToastOptions, ToastType,
};
