// SPDX-License-Identifier: MPL-2.0
//! Color theme and text direction resolution for a region.

use crate::error::{Error, Result};
use crate::host::Host;
use crate::store::lock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Listener notified with `true` when the platform prefers a dark scheme.
pub type SchemeListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Configured theme of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    /// Follows the platform color scheme preference.
    System,
}

/// Theme a region actually renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    #[must_use]
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            ResolvedTheme::Dark
        } else {
            ResolvedTheme::Light
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================================================
// Color Scheme Probes
// ==========================================================================

/// Platform source of the dark-mode preference.
///
/// Probes offer a modern change watcher, which may be unavailable, and a
/// legacy listener registration that always works.
pub trait ColorSchemeProbe: Send + Sync {
    /// Current preference.
    fn prefers_dark(&self) -> bool;

    /// Registers a change listener through the modern watcher.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when the platform has no modern watcher.
    fn watch(&self, listener: SchemeListener) -> Result<u64>;

    /// Registers a change listener through the legacy API.
    fn watch_legacy(&self, listener: SchemeListener) -> u64;

    /// Removes a listener registered by either API.
    fn unwatch(&self, token: u64);

    /// Re-reads the preference and notifies listeners when it changed.
    fn poll(&self) {}
}

/// Listener registry shared by the bundled probes.
#[derive(Default)]
struct Listeners {
    next: AtomicU64,
    entries: Mutex<Vec<(u64, SchemeListener)>>,
}

impl Listeners {
    fn add(&self, listener: SchemeListener) -> u64 {
        let token = self.next.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((token, listener));
        token
    }

    fn remove(&self, token: u64) {
        lock(&self.entries).retain(|(id, _)| *id != token);
    }

    fn notify(&self, dark: bool) {
        let listeners: Vec<SchemeListener> = lock(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(dark);
        }
    }

    fn len(&self) -> usize {
        lock(&self.entries).len()
    }
}

type Detector = Arc<dyn Fn() -> bool + Send + Sync>;

struct Detection {
    detector: Detector,
    listeners: Listeners,
    last: Mutex<Option<bool>>,
    in_flight: AtomicBool,
}

impl Detection {
    fn record(&self, dark: bool) {
        let changed = lock(&self.last).replace(dark) != Some(dark);
        if changed {
            tracing::debug!(dark, "platform color scheme changed");
            self.listeners.notify(dark);
        }
    }
}

/// Probe backed by the operating system through `dark-light`.
///
/// `dark-light` has no push notifications, so changes are observed when the
/// owning region polls. Each poll starts a detection on a background thread
/// unless one is already running, so a slow platform query never stalls a
/// frame. Listeners are notified from that thread.
pub struct DarkLightProbe {
    shared: Arc<Detection>,
}

impl DarkLightProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::with_detector(Arc::new(|| {
            matches!(dark_light::detect(), Ok(dark_light::Mode::Dark))
        }))
    }

    fn with_detector(detector: Detector) -> Self {
        Self {
            shared: Arc::new(Detection {
                detector,
                listeners: Listeners::default(),
                last: Mutex::new(None),
                in_flight: AtomicBool::new(false),
            }),
        }
    }
}

impl Default for DarkLightProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeProbe for DarkLightProbe {
    /// Last detected preference. Only the very first call queries the
    /// platform on the calling thread.
    fn prefers_dark(&self) -> bool {
        if let Some(dark) = *lock(&self.shared.last) {
            return dark;
        }
        let dark = (self.shared.detector)();
        lock(&self.shared.last).get_or_insert(dark);
        dark
    }

    fn watch(&self, listener: SchemeListener) -> Result<u64> {
        Ok(self.shared.listeners.add(listener))
    }

    fn watch_legacy(&self, listener: SchemeListener) -> u64 {
        self.shared.listeners.add(listener)
    }

    fn unwatch(&self, token: u64) {
        self.shared.listeners.remove(token);
    }

    fn poll(&self) {
        if self.shared.in_flight.swap(true, Ordering::AcqRel) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("toastline-color-scheme".into())
            .spawn(move || {
                let dark = (shared.detector)();
                shared.in_flight.store(false, Ordering::Release);
                shared.record(dark);
            });
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to start color scheme detection");
            self.shared.in_flight.store(false, Ordering::Release);
        }
    }
}

impl fmt::Debug for DarkLightProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DarkLightProbe")
            .field("listeners", &self.shared.listeners.len())
            .field("last", &*lock(&self.shared.last))
            .finish()
    }
}

/// Probe whose preference is set programmatically.
pub struct SimulatedProbe {
    dark: AtomicBool,
    modern: bool,
    listeners: Listeners,
}

impl SimulatedProbe {
    /// Probe supporting the modern watcher.
    #[must_use]
    pub fn new(dark: bool) -> Self {
        Self {
            dark: AtomicBool::new(dark),
            modern: true,
            listeners: Listeners::default(),
        }
    }

    /// Probe that only supports legacy listeners.
    #[must_use]
    pub fn legacy(dark: bool) -> Self {
        Self {
            modern: false,
            ..Self::new(dark)
        }
    }

    /// Changes the preference and notifies listeners.
    pub fn set_dark(&self, dark: bool) {
        if self.dark.swap(dark, Ordering::SeqCst) != dark {
            self.listeners.notify(dark);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ColorSchemeProbe for SimulatedProbe {
    fn prefers_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }

    fn watch(&self, listener: SchemeListener) -> Result<u64> {
        if !self.modern {
            return Err(Error::Unavailable("color scheme change watcher"));
        }
        Ok(self.listeners.add(listener))
    }

    fn watch_legacy(&self, listener: SchemeListener) -> u64 {
        self.listeners.add(listener)
    }

    fn unwatch(&self, token: u64) {
        self.listeners.remove(token);
    }
}

impl fmt::Debug for SimulatedProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedProbe")
            .field("dark", &self.prefers_dark())
            .field("modern", &self.modern)
            .finish()
    }
}

/// Live theme of a region following its probe.
pub(crate) struct ThemeWatch {
    mode: ThemeMode,
    dark: Arc<AtomicBool>,
    probe: Arc<dyn ColorSchemeProbe>,
    token: Option<u64>,
}

impl ThemeWatch {
    pub(crate) fn start(mode: ThemeMode, probe: Arc<dyn ColorSchemeProbe>) -> Self {
        let dark = Arc::new(AtomicBool::new(false));
        let token = match mode {
            ThemeMode::Light => None,
            ThemeMode::Dark => {
                dark.store(true, Ordering::SeqCst);
                None
            }
            ThemeMode::System => {
                dark.store(probe.prefers_dark(), Ordering::SeqCst);
                let target = Arc::clone(&dark);
                let listener: SchemeListener =
                    Arc::new(move |value| target.store(value, Ordering::SeqCst));
                let token = match probe.watch(Arc::clone(&listener)) {
                    Ok(token) => token,
                    Err(err) => {
                        tracing::warn!(%err, "falling back to legacy color scheme listener");
                        probe.watch_legacy(listener)
                    }
                };
                Some(token)
            }
        };
        Self {
            mode,
            dark,
            probe,
            token,
        }
    }

    pub(crate) fn poll(&self) {
        if self.mode == ThemeMode::System {
            self.probe.poll();
        }
    }

    pub(crate) fn resolved(&self) -> ResolvedTheme {
        ResolvedTheme::from_dark(self.dark.load(Ordering::SeqCst))
    }
}

impl Drop for ThemeWatch {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.probe.unwatch(token);
        }
    }
}

// ==========================================================================
// Text Direction
// ==========================================================================

/// Writing direction of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
    /// Defer to the hosting document.
    Auto,
}

impl TextDirection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
            TextDirection::Auto => "auto",
        }
    }
}

/// Resolves the direction a region renders with.
///
/// An explicit `ltr`/`rtl` wins. Otherwise the document's `dir` attribute is
/// used unless missing or `auto`, then the computed direction, then `ltr`.
#[must_use]
pub fn resolve_direction(explicit: Option<TextDirection>, host: &dyn Host) -> TextDirection {
    match explicit {
        Some(TextDirection::Ltr) => TextDirection::Ltr,
        Some(TextDirection::Rtl) => TextDirection::Rtl,
        Some(TextDirection::Auto) | None => document_direction(host),
    }
}

fn document_direction(host: &dyn Host) -> TextDirection {
    match host.dir_attribute().as_deref() {
        Some("rtl") => TextDirection::Rtl,
        Some("ltr") => TextDirection::Ltr,
        _ => host
            .computed_direction()
            .filter(|direction| *direction != TextDirection::Auto)
            .unwrap_or(TextDirection::Ltr),
    }
}
