// SPDX-License-Identifier: MPL-2.0
//! `toastline` is a headless toast notification core.
//!
//! It owns toast identity and lifecycle in a subscriber-based [`store::Store`],
//! binds toasts to async operations, and models each on-screen notification
//! region as a [`toaster::Toaster`] that a rendering layer drives frame by frame.
//!
//! # Example
//!
//! ```
//! use toastline::store::{FrameQueue, Store};
//! use toastline::toaster::Toaster;
//! use toastline::config::ToasterOptions;
//! use toastline::clock::ManualClock;
//! use std::sync::Arc;
//!
//! let frames = FrameQueue::new();
//! let store = Store::with_scheduler(Arc::new(frames.clone()));
//! let clock = Arc::new(ManualClock::new());
//! let mut toaster = Toaster::builder(store.clone(), ToasterOptions::default())
//!     .clock(clock.clone())
//!     .build();
//!
//! let id = store.success("Saved", Default::default());
//! toaster.tick();
//! assert_eq!(toaster.toasts()[0].id, id);
//! ```

#![doc(html_root_url = "https://docs.rs/toastline/0.1.0")]

pub mod clock;
pub mod config;
pub mod error;
pub mod facade;
pub mod host;
pub mod store;
pub mod toast;
pub mod toaster;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
pub use facade::{toast, Toasts};
pub use store::{Store, Subscription};
pub use toast::{Content, ToastEvent, ToastId, ToastOptions, ToastType};
pub use toaster::Toaster;
