// SPDX-License-Identifier: MPL-2.0
//! Per-toast interaction state machine.
//!
//! An [`ItemController`] drives one projected toast through
//! `Mounting → Timing ⇄ Paused → Closing → Removed`. Swiping is tracked in
//! parallel by a [`SwipeGesture`] and may jump straight to closing.
//!
//! The controller owns no toast data: every operation receives the current
//! record, the region's [`HeightTable`] and the toast's current stack offset,
//! so the region stays the single owner of the projection.

use super::gesture::{SwipeGesture, SwipeOut, SwipeRelease};
use super::layout::{HeightTable, Measurement};
use super::timer::CloseTimer;
use crate::config::defaults::{default_lifetime, unmount_delay};
use crate::toast::{Position, SwipeDirection, Toast, ToastType};
use iced_core::{mouse, Point, Vector};
use std::time::{Duration, Instant};

/// Lifecycle phase of a projected toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Projected but not yet attached by the region.
    Mounting,
    /// Counting down (or exempt from auto-close).
    Timing,
    /// Countdown suspended by expansion, interaction or a hidden document.
    Paused,
    /// Exit animation running; removal follows after the unmount delay.
    Closing { since: Instant },
    /// Ready to be dropped from the projection.
    Removed,
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerTarget {
    #[default]
    Body,
    /// An embedded button (close, action, cancel).
    Button,
}

/// State machine of one projected toast.
#[derive(Debug, Clone)]
pub struct ItemController {
    phase: Phase,
    timer: CloseTimer,
    lifetime: Duration,
    gesture: SwipeGesture,
    swipe_out: Option<SwipeOut>,
    offset_before_remove: f32,
    initial_height: f32,
}

impl ItemController {
    /// Creates a controller for `toast`, using `default_duration` when the
    /// toast does not set its own.
    #[must_use]
    pub fn new(toast: &Toast, default_duration: Option<Duration>) -> Self {
        let lifetime = lifetime_of(toast, default_duration);
        Self {
            phase: Phase::Mounting,
            timer: CloseTimer::new(lifetime),
            lifetime,
            gesture: SwipeGesture::new(),
            swipe_out: None,
            offset_before_remove: 0.0,
            initial_height: 0.0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Attaches the toast. The countdown starts on the next timer run.
    pub fn mount(&mut self) {
        if self.phase == Phase::Mounting {
            self.phase = Phase::Timing;
        }
    }

    /// Records a (re-)measurement of the toast's natural height.
    pub fn measure(
        &mut self,
        toast: &Toast,
        position: Position,
        measurement: &Measurement,
        heights: &mut HeightTable,
    ) {
        if self.is_removed() {
            return;
        }
        let height = measurement.height();
        self.initial_height = height;
        heights.upsert(&toast.id, height, position);
    }

    /// Applies an in-place update of the record.
    ///
    /// A changed lifetime restarts the countdown with the new value.
    pub fn refresh(&mut self, toast: &Toast, default_duration: Option<Duration>, now: Instant) {
        let lifetime = lifetime_of(toast, default_duration);
        if lifetime != self.lifetime {
            self.lifetime = lifetime;
            self.timer.restart(lifetime, now);
        }
    }

    /// Restores the full lifetime, e.g. when a duplicate was suppressed.
    pub fn restart_timer(&mut self, now: Instant) {
        self.timer.restart(self.lifetime, now);
    }

    /// True when `toast` never auto-closes in its current state.
    #[must_use]
    pub fn is_exempt(toast: &Toast) -> bool {
        toast.toast_type == ToastType::Loading || toast.is_infinite()
    }

    /// Advances the close timer. Returns true when it expired and the toast
    /// started closing.
    ///
    /// Exempt toasts hold their timer paused until they stop being exempt.
    pub fn run_timer(
        &mut self,
        toast: &Toast,
        paused: bool,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        if !matches!(self.phase, Phase::Timing | Phase::Paused) {
            return false;
        }

        if paused || Self::is_exempt(toast) {
            self.timer.pause(now);
            self.phase = Phase::Paused;
            return false;
        }

        self.timer.resume(now);
        self.phase = Phase::Timing;
        if !self.timer.expired(now) {
            return false;
        }

        tracing::debug!(id = %toast.id, "toast auto-closed");
        if let Some(callback) = &toast.on_auto_close {
            callback.call(toast);
        }
        self.begin_close(toast, heights, offset, now)
    }

    // =========================================================================
    // Swipe
    // =========================================================================

    /// Handles a pointer press on the toast. Returns true when the press was
    /// accepted.
    ///
    /// Only the primary button starts a swipe, and only on dismissible toasts
    /// that are not loading.
    pub fn press(
        &mut self,
        toast: &Toast,
        button: mouse::Button,
        target: PointerTarget,
        at: Point,
        offset: f32,
        now: Instant,
    ) -> bool {
        if button != mouse::Button::Left
            || toast.toast_type == ToastType::Loading
            || !toast.dismissible
            || self.is_removed()
        {
            return false;
        }
        self.offset_before_remove = offset;
        self.gesture
            .press(at, target == PointerTarget::Button, now);
        true
    }

    /// Handles pointer movement. Returns true when the live offset changed.
    pub fn drag(
        &mut self,
        toast: &Toast,
        at: Point,
        allowed: &[SwipeDirection],
        text_selected: bool,
    ) -> bool {
        if !toast.dismissible || self.is_removed() {
            return false;
        }
        self.gesture.track(at, allowed, text_selected)
    }

    /// Handles the pointer release.
    ///
    /// A committed swipe calls `on_dismiss` and starts closing.
    pub fn release(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> Option<SwipeRelease> {
        if self.swipe_out.is_some() || !toast.dismissible || self.is_removed() {
            return None;
        }

        let release = self.gesture.release(now);
        if let SwipeRelease::Committed(out) = release {
            tracing::debug!(id = %toast.id, direction = out.as_str(), "toast swiped out");
            self.offset_before_remove = offset;
            if let Some(callback) = &toast.on_dismiss {
                callback.call(toast);
            }
            self.swipe_out = Some(out);
            self.begin_close(toast, heights, offset, now);
        }
        Some(release)
    }

    /// Handles the end of a native drag.
    pub fn drag_end(&mut self) {
        self.gesture.cancel();
    }

    // =========================================================================
    // Buttons and external dismissal
    // =========================================================================

    /// Close button activation. Ignored while loading or not dismissible.
    pub fn close(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        if toast.toast_type == ToastType::Loading || !toast.dismissible {
            return false;
        }
        let closing = self.begin_close(toast, heights, offset, now);
        if closing {
            if let Some(callback) = &toast.on_dismiss {
                callback.call(toast);
            }
        }
        closing
    }

    /// Cancel button activation: runs its callback, then closes.
    pub fn click_cancel(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        let Some(cancel) = toast.cancel.as_ref().and_then(|slot| slot.as_action()) else {
            return false;
        };
        if !toast.dismissible || self.is_removed() {
            return false;
        }
        cancel.click();
        self.begin_close(toast, heights, offset, now)
    }

    /// Action button activation: runs its callback, then closes unless the
    /// callback prevented the default.
    pub fn click_action(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        let Some(action) = toast.action.as_ref().and_then(|slot| slot.as_action()) else {
            return false;
        };
        if self.is_removed() {
            return false;
        }
        if action.click().default_prevented() {
            return false;
        }
        self.begin_close(toast, heights, offset, now)
    }

    /// Reacts to a tombstone delivered for this toast.
    pub fn delete(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        let closing = self.begin_close(toast, heights, offset, now);
        if closing {
            if let Some(callback) = &toast.on_dismiss {
                callback.call(toast);
            }
        }
        closing
    }

    /// Finishes closing once the unmount delay elapsed. Returns true when the
    /// toast just became removable.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Closing { since } if now.saturating_duration_since(since) >= unmount_delay() => {
                self.phase = Phase::Removed;
                true
            }
            _ => false,
        }
    }

    /// Next instant this controller needs a frame, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Closing { since } => since.checked_add(unmount_delay()),
            Phase::Timing => self.timer.deadline(),
            _ => None,
        }
    }

    fn begin_close(
        &mut self,
        toast: &Toast,
        heights: &mut HeightTable,
        offset: f32,
        now: Instant,
    ) -> bool {
        if self.is_removed() {
            return false;
        }
        self.offset_before_remove = offset;
        heights.remove(&toast.id);
        self.timer.pause(now);
        self.phase = Phase::Closing { since: now };
        tracing::debug!(id = %toast.id, "toast closing");
        true
    }

    // =========================================================================
    // Render Flags
    // =========================================================================

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.phase != Phase::Mounting
    }

    /// True once closing started.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self.phase, Phase::Closing { .. } | Phase::Removed)
    }

    #[must_use]
    pub fn is_swiping(&self) -> bool {
        self.gesture.is_swiping()
    }

    #[must_use]
    pub fn is_swiped(&self) -> bool {
        self.gesture.is_swiped()
    }

    #[must_use]
    pub fn swipe_out(&self) -> Option<SwipeOut> {
        self.swipe_out
    }

    #[must_use]
    pub fn swipe_amount(&self) -> Vector {
        self.gesture.amount()
    }

    #[must_use]
    pub fn initial_height(&self) -> f32 {
        self.initial_height
    }

    /// Offset to render: frozen at the last known value once closing.
    #[must_use]
    pub fn render_offset(&self, live: f32) -> f32 {
        if self.is_removed() {
            self.offset_before_remove
        } else {
            live
        }
    }
}

fn lifetime_of(toast: &Toast, default_duration: Option<Duration>) -> Duration {
    toast
        .duration
        .or(default_duration)
        .unwrap_or_else(default_lifetime)
}
