// SPDX-License-Identifier: MPL-2.0
//! Host environment queried by toaster regions.
//!
//! The core never touches a document directly. Everything it needs to know
//! about the page (visibility, text selection, direction) comes through the
//! [`Host`] trait. Every method has a neutral default so hosts only override
//! what they can answer.

use crate::store::lock;
use crate::toaster::TextDirection;
use std::sync::Mutex;

/// Environment facts consulted by regions and their toasts.
pub trait Host: Send + Sync {
    /// True while the hosting document is not visible. Pauses close timers.
    fn is_document_hidden(&self) -> bool {
        false
    }

    /// True while the user has selected text. Swipe movement is ignored.
    fn has_text_selection(&self) -> bool {
        false
    }

    /// Raw `dir` attribute of the document root, if present.
    fn dir_attribute(&self) -> Option<String> {
        None
    }

    /// Computed writing direction of the document root.
    fn computed_direction(&self) -> Option<TextDirection> {
        None
    }
}

/// Host with no document: always visible, no selection, left-to-right.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Host for Headless {}

#[derive(Debug, Default)]
struct SimulatedState {
    hidden: bool,
    selection: bool,
    dir_attribute: Option<String>,
    computed_direction: Option<TextDirection>,
}

/// Host whose answers are set programmatically.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: Mutex<SimulatedState>,
}

impl SimulatedHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_document_hidden(&self, hidden: bool) {
        lock(&self.state).hidden = hidden;
    }

    pub fn set_text_selection(&self, selection: bool) {
        lock(&self.state).selection = selection;
    }

    pub fn set_dir_attribute(&self, dir: Option<&str>) {
        lock(&self.state).dir_attribute = dir.map(str::to_owned);
    }

    pub fn set_computed_direction(&self, direction: Option<TextDirection>) {
        lock(&self.state).computed_direction = direction;
    }
}

impl Host for SimulatedHost {
    fn is_document_hidden(&self) -> bool {
        lock(&self.state).hidden
    }

    fn has_text_selection(&self) -> bool {
        lock(&self.state).selection
    }

    fn dir_attribute(&self) -> Option<String> {
        lock(&self.state).dir_attribute.clone()
    }

    fn computed_direction(&self) -> Option<TextDirection> {
        lock(&self.state).computed_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_defaults_are_neutral() {
        let host = Headless;
        assert!(!host.is_document_hidden());
        assert!(!host.has_text_selection());
        assert!(host.dir_attribute().is_none());
        assert!(host.computed_direction().is_none());
    }

    #[test]
    fn simulated_host_reports_what_was_set() {
        let host = SimulatedHost::new();
        host.set_document_hidden(true);
        host.set_text_selection(true);
        host.set_dir_attribute(Some("rtl"));
        host.set_computed_direction(Some(TextDirection::Rtl));

        assert!(host.is_document_hidden());
        assert!(host.has_text_selection());
        assert_eq!(host.dir_attribute().as_deref(), Some("rtl"));
        assert_eq!(host.computed_direction(), Some(TextDirection::Rtl));
    }
}
