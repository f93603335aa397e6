// SPDX-License-Identifier: MPL-2.0
//! Swipe-to-dismiss gesture tracking.
//!
//! A swipe starts on pointer down, locks onto the first axis whose movement
//! exceeds [`SWIPE_AXIS_LOCK_PX`], and is evaluated on pointer up: a long or
//! fast enough swipe commits, anything else snaps back.

use crate::config::defaults::{SWIPE_AXIS_LOCK_PX, SWIPE_THRESHOLD_PX, SWIPE_VELOCITY_THRESHOLD};
use crate::toast::SwipeDirection;
use iced_core::{Point, Vector};
use std::time::Instant;

/// Axis a swipe is locked onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAxis {
    X,
    Y,
}

/// Direction a committed swipe leaves the screen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOut {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeOut {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeOut::Left => "left",
            SwipeOut::Right => "right",
            SwipeOut::Up => "up",
            SwipeOut::Down => "down",
        }
    }
}

/// Outcome of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeRelease {
    /// The swipe was long or fast enough; the toast leaves in this direction.
    Committed(SwipeOut),
    /// The live offset snapped back to zero.
    Reset,
}

/// Resistance applied to movement against the allowed directions.
#[must_use]
pub fn dampening(delta: f32) -> f32 {
    1.0 / (1.5 + delta.abs() / 20.0)
}

/// Live swipe state of one toast.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeGesture {
    started_at: Option<Instant>,
    pointer_start: Option<Point>,
    axis: Option<SwipeAxis>,
    amount: Vector,
    swiping: bool,
    swiped: bool,
}

impl Default for SwipeGesture {
    fn default() -> Self {
        Self {
            started_at: None,
            pointer_start: None,
            axis: None,
            amount: Vector::new(0.0, 0.0),
            swiping: false,
            swiped: false,
        }
    }
}

impl SwipeGesture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer press.
    ///
    /// Presses on embedded buttons only start the release clock; the swipe
    /// itself is not tracked.
    pub fn press(&mut self, at: Point, on_button: bool, now: Instant) {
        self.started_at = Some(now);
        if on_button {
            return;
        }
        self.swiping = true;
        self.pointer_start = Some(at);
    }

    /// Tracks pointer movement. Returns true when the live offset changed.
    ///
    /// Movement is ignored while `text_selected` is set.
    pub fn track(&mut self, at: Point, allowed: &[SwipeDirection], text_selected: bool) -> bool {
        let Some(start) = self.pointer_start else {
            return false;
        };
        if text_selected {
            return false;
        }

        let x_delta = at.x - start.x;
        let y_delta = at.y - start.y;

        if self.axis.is_none()
            && (x_delta.abs() > SWIPE_AXIS_LOCK_PX || y_delta.abs() > SWIPE_AXIS_LOCK_PX)
        {
            self.axis = Some(if x_delta.abs() > y_delta.abs() {
                SwipeAxis::X
            } else {
                SwipeAxis::Y
            });
        }

        let mut amount = Vector::new(0.0, 0.0);
        match self.axis {
            Some(SwipeAxis::Y) => {
                amount.y = axis_amount(
                    y_delta,
                    allowed.contains(&SwipeDirection::Top),
                    allowed.contains(&SwipeDirection::Bottom),
                );
            }
            Some(SwipeAxis::X) => {
                amount.x = axis_amount(
                    x_delta,
                    allowed.contains(&SwipeDirection::Left),
                    allowed.contains(&SwipeDirection::Right),
                );
            }
            None => {}
        }

        if amount.x.abs() > 0.0 || amount.y.abs() > 0.0 {
            self.swiped = true;
        }
        let changed = amount != self.amount;
        self.amount = amount;
        changed
    }

    /// Evaluates the swipe when the pointer is released.
    pub fn release(&mut self, now: Instant) -> SwipeRelease {
        self.pointer_start = None;

        let elapsed_ms = self
            .started_at
            .map_or(0.0, |started| {
                now.saturating_duration_since(started).as_secs_f32() * 1000.0
            })
            .max(1.0);

        let amount = match self.axis {
            Some(SwipeAxis::X) => self.amount.x,
            _ => self.amount.y,
        };
        let velocity = amount.abs() / elapsed_ms;

        if amount.abs() >= SWIPE_THRESHOLD_PX || velocity > SWIPE_VELOCITY_THRESHOLD {
            let out = match self.axis {
                Some(SwipeAxis::X) if self.amount.x > 0.0 => SwipeOut::Right,
                Some(SwipeAxis::X) => SwipeOut::Left,
                _ if self.amount.y > 0.0 => SwipeOut::Down,
                _ => SwipeOut::Up,
            };
            return SwipeRelease::Committed(out);
        }

        self.amount = Vector::new(0.0, 0.0);
        self.swiped = false;
        self.swiping = false;
        self.axis = None;
        SwipeRelease::Reset
    }

    /// Abandons tracking after a native drag ended.
    pub fn cancel(&mut self) {
        self.swiping = false;
        self.axis = None;
        self.pointer_start = None;
    }

    #[must_use]
    pub fn amount(&self) -> Vector {
        self.amount
    }

    #[must_use]
    pub fn axis(&self) -> Option<SwipeAxis> {
        self.axis
    }

    #[must_use]
    pub fn is_swiping(&self) -> bool {
        self.swiping
    }

    #[must_use]
    pub fn is_swiped(&self) -> bool {
        self.swiped
    }
}

fn axis_amount(delta: f32, allows_negative: bool, allows_positive: bool) -> f32 {
    if !allows_negative && !allows_positive {
        return 0.0;
    }
    if (allows_negative && delta < 0.0) || (allows_positive && delta > 0.0) {
        return delta;
    }
    let dampened = delta * dampening(delta);
    if dampened.abs() < delta.abs() {
        dampened
    } else {
        delta
    }
}
