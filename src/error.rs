// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

/// Errors surfaced by the configuration layer and platform probes.
///
/// Toast operations themselves never fail: malformed ids and missing
/// promise configuration are normalized instead of reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("toaster config I/O failed: {0}")]
    Io(String),
    #[error("invalid toaster config: {0}")]
    Config(String),
    /// A string option did not name a known value.
    #[error("unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.message().to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
