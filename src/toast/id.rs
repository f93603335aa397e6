// SPDX-License-Identifier: MPL-2.0
//! Toast identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a toast within one store.
///
/// Numeric ids are allocated by the store from a monotonic counter starting
/// at 1. Named ids are chosen by callers that want to address a toast later
/// (update-by-id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToastId {
    Number(u64),
    Name(String),
}

impl ToastId {
    /// Returns true for an empty name, which callers use to mean "no id".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ToastId::Name(name) if name.is_empty())
    }

    /// Returns the numeric value for store-allocated ids.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            ToastId::Number(n) => Some(*n),
            ToastId::Name(_) => None,
        }
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastId::Number(n) => write!(f, "{n}"),
            ToastId::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for ToastId {
    fn from(value: u64) -> Self {
        ToastId::Number(value)
    }
}

impl From<&str> for ToastId {
    fn from(value: &str) -> Self {
        ToastId::Name(value.to_owned())
    }
}

impl From<String> for ToastId {
    fn from(value: String) -> Self {
        ToastId::Name(value)
    }
}

impl From<&ToastId> for ToastId {
    fn from(value: &ToastId) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for ToastId {
    fn eq(&self, other: &str) -> bool {
        matches!(self, ToastId::Name(name) if name == other)
    }
}

impl PartialEq<&str> for ToastId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
