// SPDX-License-Identifier: MPL-2.0
//! Region configuration, including loading and saving it to a `toaster.toml`
//! file.
//!
//! Options are plain serde structs; every field is optional in the file and
//! missing ones take the region defaults.
//!
//! ```no_run
//! use toastline::config::{self, ToasterOptions};
//! use toastline::toast::Position;
//!
//! let mut options = config::load("my-app").unwrap_or_default();
//! options.position = Position::TopCenter;
//! options.prevent_duplicates = true;
//! config::save("my-app", &options)?;
//!
//! let sidebar: ToasterOptions = toml::from_str("id = \"sidebar\"\ngap = 8.0")
//!     .map_err(toastline::Error::from)?;
//! assert_eq!(sidebar.id.as_deref(), Some("sidebar"));
//! # Ok::<(), toastline::Error>(())
//! ```

pub mod defaults;

use crate::error::Result;
use crate::toast::{Position, Style, SwipeDirection};
use crate::toaster::{Offset, TextDirection, ThemeMode};
use defaults::{DEFAULT_HOTKEY, GAP_PX, VISIBLE_TOASTS_AMOUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "toaster.toml";

/// Defaults applied to every toast rendered by a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_button: Option<bool>,
    pub unstyled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_button_aria_label: Option<String>,
}

/// Configuration of one toaster region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToasterOptions {
    /// Region id. Only toasts carrying the same `toaster_id` are shown; the
    /// unnamed region shows toasts without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub position: Position,
    /// Default auto-close delay in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub visible_toasts: usize,
    pub gap: f32,
    /// Render the stack expanded once mounted.
    pub expand: bool,
    pub rich_colors: bool,
    pub close_button: bool,
    pub invert: bool,
    pub theme: ThemeMode,
    /// Overrides the directions derived from the position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_directions: Option<Vec<SwipeDirection>>,
    pub hotkey: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_offset: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<TextDirection>,
    /// Suppress a toast identical to the newest one at its position.
    pub prevent_duplicates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_aria_label: Option<String>,
    pub toast_defaults: ToastDefaults,
}

impl Default for ToasterOptions {
    fn default() -> Self {
        Self {
            id: None,
            position: Position::default(),
            duration_ms: None,
            visible_toasts: VISIBLE_TOASTS_AMOUNT,
            gap: GAP_PX,
            expand: false,
            rich_colors: false,
            close_button: false,
            invert: false,
            theme: ThemeMode::default(),
            swipe_directions: None,
            hotkey: DEFAULT_HOTKEY.iter().map(|part| (*part).to_string()).collect(),
            offset: None,
            mobile_offset: None,
            dir: None,
            prevent_duplicates: false,
            custom_aria_label: None,
            container_aria_label: None,
            toast_defaults: ToastDefaults::default(),
        }
    }
}

impl ToasterOptions {
    /// Region id builder.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Default duration for toasts without their own. The toast defaults
    /// take precedence over the region-level value; zero counts as unset.
    #[must_use]
    pub fn default_duration(&self) -> Option<Duration> {
        self.toast_defaults
            .duration_ms
            .or(self.duration_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Visible toast cap; zero falls back to the default.
    #[must_use]
    pub fn visible_toasts(&self) -> usize {
        if self.visible_toasts == 0 {
            VISIBLE_TOASTS_AMOUNT
        } else {
            self.visible_toasts
        }
    }

    /// Stack gap; zero or negative falls back to the default.
    #[must_use]
    pub fn gap(&self) -> f32 {
        if self.gap > 0.0 {
            self.gap
        } else {
            GAP_PX
        }
    }
}

fn get_default_config_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(app_name);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the options stored for `app_name`, or the defaults when none exist.
pub fn load(app_name: &str) -> Result<ToasterOptions> {
    if let Some(path) = get_default_config_path(app_name) {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(ToasterOptions::default())
}

/// Saves `options` under the configuration directory of `app_name`.
pub fn save(app_name: &str, options: &ToasterOptions) -> Result<()> {
    if let Some(path) = get_default_config_path(app_name) {
        return save_to_path(options, &path);
    }
    Ok(())
}

/// Reads options from `path`. Malformed content yields the defaults.
pub fn load_from_path(path: &Path) -> Result<ToasterOptions> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "invalid toaster config, using defaults");
        ToasterOptions::default()
    }))
}

/// Writes `options` to `path`, creating parent directories.
pub fn save_to_path(options: &ToasterOptions, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(options)?;
    fs::write(path, content)?;
    Ok(())
}
