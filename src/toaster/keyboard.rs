// SPDX-License-Identifier: MPL-2.0
//! Region keyboard shortcut handling.

use crate::config::defaults::DEFAULT_HOTKEY;
use iced_core::keyboard::Modifiers;

/// Key code that collapses a focused region.
pub const ESCAPE: &str = "Escape";

/// A key press delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Physical key code, e.g. `KeyT` or `Escape`.
    pub code: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(code: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            code: code.into(),
            modifiers,
        }
    }
}

/// Key combination expanding and focusing a region.
///
/// Each part is either a modifier name (`altKey`, `ctrlKey`, `shiftKey`,
/// `metaKey`) or an exact key code. All parts must be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    parts: Vec<String>,
}

impl Hotkey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// True when every part is held or pressed. An empty hotkey never matches.
    #[must_use]
    pub fn matches(&self, press: &KeyPress) -> bool {
        !self.parts.is_empty()
            && self
                .parts
                .iter()
                .all(|part| modifier_held(part, press.modifiers) || press.code == *part)
    }

    /// Human readable label, e.g. `alt+T`.
    #[must_use]
    pub fn label(&self) -> String {
        self.parts
            .join("+")
            .replace("Key", "")
            .replace("Digit", "")
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::new(DEFAULT_HOTKEY)
    }
}

fn modifier_held(part: &str, modifiers: Modifiers) -> bool {
    match part {
        "altKey" => modifiers.alt(),
        "ctrlKey" => modifiers.control(),
        "shiftKey" => modifiers.shift(),
        "metaKey" => modifiers.logo(),
        _ => false,
    }
}
