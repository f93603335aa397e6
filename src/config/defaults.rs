// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all toast and toaster constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Lifetime**: Auto-close duration and unmount grace delay
//! - **Stack**: Visible toast cap, gap and width
//! - **Swipe**: Gesture commit thresholds
//! - **Viewport**: Region edge offsets, hotkey and labels
//! - **Theme**: Platform color scheme polling

use std::time::Duration;

// ==========================================================================
// Lifetime Defaults
// ==========================================================================

/// Auto-close delay used when neither the toast nor the region sets one (ms).
pub const DEFAULT_TOAST_LIFETIME_MS: u64 = 4000;

/// Delay between a toast starting to close and its removal from the region (ms).
///
/// Gives the rendering layer time to play the exit animation.
pub const TIME_BEFORE_UNMOUNT_MS: u64 = 200;

/// Duration meaning "never auto-close".
pub const INFINITE: Duration = Duration::MAX;

// ==========================================================================
// Stack Defaults
// ==========================================================================

/// Number of toasts rendered as visible in a collapsed stack.
pub const VISIBLE_TOASTS_AMOUNT: usize = 3;

/// Gap between stacked toasts in pixels.
pub const GAP_PX: f32 = 14.0;

/// Toast width in pixels, exposed to the rendering layer.
pub const TOAST_WIDTH_PX: f32 = 356.0;

// ==========================================================================
// Swipe Defaults
// ==========================================================================

/// Minimum swipe distance (px) that commits a dismissal.
pub const SWIPE_THRESHOLD_PX: f32 = 45.0;

/// Minimum swipe velocity (px/ms) that commits a dismissal.
pub const SWIPE_VELOCITY_THRESHOLD: f32 = 0.11;

/// Movement (px) an axis must exceed before the swipe locks onto it.
pub const SWIPE_AXIS_LOCK_PX: f32 = 1.0;

// ==========================================================================
// Viewport Defaults
// ==========================================================================

/// Default desktop offset applied to every region edge.
pub const VIEWPORT_OFFSET: &str = "24px";

/// Default mobile offset applied to every region edge.
pub const MOBILE_VIEWPORT_OFFSET: &str = "16px";

/// Default keyboard shortcut that expands and focuses a region.
pub const DEFAULT_HOTKEY: [&str; 2] = ["altKey", "KeyT"];

/// Default accessible label prefix of a region.
pub const DEFAULT_CONTAINER_ARIA_LABEL: &str = "Notifications";

/// Default accessible label of the close button.
pub const DEFAULT_CLOSE_BUTTON_ARIA_LABEL: &str = "Close toast";

// ==========================================================================
// Theme Defaults
// ==========================================================================

/// Minimum delay between two platform color scheme polls (ms).
pub const THEME_POLL_INTERVAL_MS: u64 = 1000;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(DEFAULT_TOAST_LIFETIME_MS > 0);
    assert!(TIME_BEFORE_UNMOUNT_MS > 0);
    assert!(VISIBLE_TOASTS_AMOUNT > 0);
    assert!(GAP_PX >= 0.0);
    assert!(SWIPE_THRESHOLD_PX > SWIPE_AXIS_LOCK_PX);
    assert!(SWIPE_VELOCITY_THRESHOLD > 0.0);
    assert!(THEME_POLL_INTERVAL_MS > 0);
};

/// Default toast lifetime as a [`Duration`].
#[must_use]
pub fn default_lifetime() -> Duration {
    Duration::from_millis(DEFAULT_TOAST_LIFETIME_MS)
}

/// Unmount grace delay as a [`Duration`].
#[must_use]
pub fn unmount_delay() -> Duration {
    Duration::from_millis(TIME_BEFORE_UNMOUNT_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_helpers_match_constants() {
        assert_eq!(default_lifetime(), Duration::from_secs(4));
        assert_eq!(unmount_delay(), Duration::from_millis(200));
    }

    #[test]
    fn hotkey_defaults_to_alt_t() {
        assert_eq!(DEFAULT_HOTKEY, ["altKey", "KeyT"]);
    }
}
