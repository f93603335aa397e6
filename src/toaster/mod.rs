// SPDX-License-Identifier: MPL-2.0
//! Toaster regions: per-region projection of the store's event stream.
//!
//! A [`Toaster`] subscribes to a [`Store`] when built. Its listener only queues
//! events; the region applies them on its next frame ([`Toaster::tick`]), where
//! it also drives every projected toast's [`ItemController`]. The rendering
//! layer reads [`Toaster::view`] and reports pointer, focus and key events back
//! through the region's entry points.
//!
//! Regions are independent: each keeps its own toasts, heights, expansion and
//! focus state, and only shows toasts routed to its id.

pub mod gesture;
mod headless;
pub mod item;
pub mod keyboard;
pub mod layout;
pub mod theme;
pub mod timer;

pub use gesture::{SwipeAxis, SwipeGesture, SwipeOut, SwipeRelease};
pub use headless::ToastFeed;
pub use item::{ItemController, Phase, PointerTarget};
pub use keyboard::{Hotkey, KeyPress, ESCAPE};
pub use layout::{
    EdgeOffsets, EdgeValues, HeightEntry, HeightTable, Measurement, Offset, OffsetValue,
    RegionOffsets,
};
pub use theme::{
    resolve_direction, ColorSchemeProbe, DarkLightProbe, ResolvedTheme, SchemeListener,
    SimulatedProbe, TextDirection, ThemeMode,
};

use crate::clock::{Clock, SystemClock};
use crate::config::defaults::{
    DEFAULT_CLOSE_BUTTON_ARIA_LABEL, DEFAULT_CONTAINER_ARIA_LABEL, THEME_POLL_INTERVAL_MS,
    TOAST_WIDTH_PX,
};
use crate::config::ToasterOptions;
use crate::host::{Headless, Host};
use crate::store::{lock, Store, Subscription};
use crate::toast::{Position, Style, SwipeDirection, Toast, ToastEvent, ToastId, ToastType};
use iced_core::{mouse, Point, Vector};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use theme::ThemeWatch;

/// Opaque handle of a focusable element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusHandle(pub u64);

/// Store events queued until the owner's next frame.
#[derive(Clone, Default)]
pub(crate) struct Inbox {
    events: Arc<Mutex<Vec<ToastEvent>>>,
}

impl Inbox {
    /// Subscribes a fresh inbox to `store`.
    pub(crate) fn attach(store: &Store) -> (Self, Subscription) {
        let inbox = Self::default();
        let sink = Arc::clone(&inbox.events);
        let subscription = store.subscribe(move |event| lock(&sink).push(event.clone()));
        (inbox, subscription)
    }

    pub(crate) fn drain(&self) -> Vec<ToastEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    pub(crate) fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }
}

/// Region-level events, for hosts that route messages instead of calling
/// the entry points directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Frame tick.
    Tick,
    PointerEnter,
    PointerMove,
    PointerLeave,
    /// Pointer pressed inside the region; `true` when the target is dismissible.
    PointerDown(bool),
    PointerUp,
    DragEnd,
    KeyDown(KeyPress),
}

/// Snapshot of one toast as the rendering layer should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastView {
    pub toast: Toast,
    pub position: Position,
    /// Index within the position group, newest first.
    pub index: usize,
    pub front: bool,
    /// Within the visible toast cap.
    pub visible: bool,
    pub mounted: bool,
    /// Closing or removed.
    pub removed: bool,
    pub swiping: bool,
    pub swiped: bool,
    pub swipe_out: Option<SwipeOut>,
    pub swipe_amount: Vector,
    pub expanded: bool,
    pub dismissible: bool,
    pub toast_type: ToastType,
    pub rich_colors: bool,
    pub invert: bool,
    pub styled: bool,
    pub close_button: bool,
    pub close_button_aria_label: String,
    /// Stack offset in pixels.
    pub offset: f32,
    /// Measured height, `None` when the region renders expanded by default.
    pub initial_height: Option<f32>,
    pub z_index: usize,
    /// Changes every time a duplicate of this toast was suppressed.
    pub highlight: u64,
    pub class_name: Option<String>,
    pub description_class_name: Option<String>,
    pub style: Style,
}

/// Toasts sharing one screen position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionGroup {
    pub position: Position,
    pub toasts: Vec<ToastView>,
    /// Height of the newest measured toast at this position.
    pub front_toast_height: f32,
    pub gap: f32,
    pub width: f32,
}

#[derive(Debug)]
struct Entry {
    toast: Toast,
    item: ItemController,
    highlight: u64,
}

/// Stack placement of one entry.
#[derive(Debug, Clone, Copy)]
struct Slot {
    position: Position,
    index: usize,
    offset: f32,
}

#[derive(Debug)]
struct Tally {
    position: Position,
    len: usize,
    height: f32,
}

/// Builder for [`Toaster`].
pub struct ToasterBuilder {
    store: Store,
    options: ToasterOptions,
    clock: Option<Arc<dyn Clock>>,
    host: Option<Arc<dyn Host>>,
    probe: Option<Arc<dyn ColorSchemeProbe>>,
}

impl ToasterBuilder {
    /// Time source for timers and gestures. Defaults to [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Host environment. Defaults to [`Headless`].
    #[must_use]
    pub fn host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Color scheme probe used by [`ThemeMode::System`]. Defaults to
    /// [`DarkLightProbe`].
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn ColorSchemeProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Subscribes the region to the store.
    #[must_use]
    pub fn build(self) -> Toaster {
        let (inbox, subscription) = Inbox::attach(&self.store);
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(DarkLightProbe::new()));
        let theme = ThemeWatch::start(self.options.theme, probe);
        let hotkey = Hotkey::new(self.options.hotkey.iter().cloned());
        let offsets =
            RegionOffsets::resolve(self.options.offset.as_ref(), self.options.mobile_offset.as_ref());

        tracing::debug!(
            region = self.options.id.as_deref().unwrap_or("default"),
            theme = %theme.resolved(),
            "toaster mounted"
        );

        Toaster {
            store: self.store,
            options: self.options,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            host: self.host.unwrap_or_else(|| Arc::new(Headless)),
            inbox,
            subscription: Some(subscription),
            deferred_tombstones: Vec::new(),
            entries: Vec::new(),
            heights: HeightTable::new(),
            hotkey,
            theme,
            last_theme_poll: None,
            offsets,
            expanded: false,
            interacting: false,
            hovering: false,
            focus_within: false,
            last_focused: None,
            focus_requested: false,
            highlights: 0,
        }
    }
}

/// One toaster region.
pub struct Toaster {
    store: Store,
    options: ToasterOptions,
    clock: Arc<dyn Clock>,
    host: Arc<dyn Host>,
    inbox: Inbox,
    subscription: Option<Subscription>,
    /// Tombstones received during the last frame, applied on the next one.
    deferred_tombstones: Vec<ToastId>,
    /// Projected toasts, newest first.
    entries: Vec<Entry>,
    heights: HeightTable,
    hotkey: Hotkey,
    theme: ThemeWatch,
    last_theme_poll: Option<Instant>,
    offsets: RegionOffsets,
    expanded: bool,
    interacting: bool,
    hovering: bool,
    focus_within: bool,
    last_focused: Option<FocusHandle>,
    focus_requested: bool,
    highlights: u64,
}

impl Toaster {
    /// Starts building a region over `store`.
    #[must_use]
    pub fn builder(store: Store, options: ToasterOptions) -> ToasterBuilder {
        ToasterBuilder {
            store,
            options,
            clock: None,
            host: None,
            probe: None,
        }
    }

    /// Builds a region with the system clock, no host document and the
    /// platform color scheme probe.
    #[must_use]
    pub fn new(store: Store, options: ToasterOptions) -> Self {
        Self::builder(store, options).build()
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Runs one frame: applies queued store events and advances every toast.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        for id in std::mem::take(&mut self.deferred_tombstones) {
            for entry in self.entries.iter_mut().filter(|entry| entry.toast.id == id) {
                entry.toast.delete = true;
            }
        }

        for event in self.inbox.drain() {
            match event {
                ToastEvent::Upsert(toast) => self.ingest(toast, now),
                ToastEvent::Dismiss { id } => self.deferred_tombstones.push(id),
            }
        }

        if self.entries.len() <= 1 {
            self.expanded = false;
        }

        self.poll_theme(now);

        let paused = self.expanded || self.interacting || self.host.is_document_hidden();
        let slots = self.slots();
        let mut finished = Vec::new();

        for (entry, slot) in self.entries.iter_mut().zip(&slots) {
            entry.item.mount();
            if entry.toast.delete && !entry.item.is_removed() {
                entry
                    .item
                    .delete(&entry.toast, &mut self.heights, slot.offset, now);
            }
            entry
                .item
                .run_timer(&entry.toast, paused, &mut self.heights, slot.offset, now);
            if entry.item.advance(now) {
                finished.push((entry.toast.id.clone(), entry.toast.delete));
            }
        }

        for (id, deleted) in finished {
            self.entries.retain(|entry| entry.toast.id != id);
            self.heights.remove(&id);
            tracing::debug!(%id, "toast removed from region");
            if !deleted {
                self.store.dismiss(id);
            }
        }
    }

    /// Handles a region-level message.
    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Tick => self.tick(),
            Message::PointerEnter => self.pointer_enter(),
            Message::PointerMove => self.pointer_move(),
            Message::PointerLeave => self.pointer_leave(),
            Message::PointerDown(dismissible) => self.pointer_down(*dismissible),
            Message::PointerUp => self.pointer_up(),
            Message::DragEnd => self.drag_end(),
            Message::KeyDown(press) => {
                self.key_down(press);
            }
        }
    }

    /// Next instant a frame is needed, if any.
    ///
    /// Queued events need a frame right away.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.inbox.is_empty() || !self.deferred_tombstones.is_empty() {
            return Some(self.clock.now());
        }
        self.entries
            .iter()
            .filter_map(|entry| entry.item.deadline())
            .min()
    }

    fn accepts(&self, toast: &Toast) -> bool {
        match self.options.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => toast.toaster_id.as_deref() == Some(id),
            None => toast.toaster_id.is_none(),
        }
    }

    fn ingest(&mut self, toast: Toast, now: Instant) {
        let existing = self.entries.iter().position(|entry| entry.toast.id == toast.id);
        if !self.accepts(&toast) {
            if let Some(index) = existing {
                self.entries.remove(index);
                self.heights.remove(&toast.id);
                tracing::debug!(id = %toast.id, "toast moved to another region");
            }
            return;
        }
        let default_duration = self.options.default_duration();

        if let Some(index) = existing {
            let entry = &mut self.entries[index];
            if !entry.item.is_removed() {
                let delete = entry.toast.delete;
                entry.toast = toast;
                entry.toast.delete = delete;
                entry.item.refresh(&entry.toast, default_duration, now);
                return;
            }
            self.entries.remove(index);
        }

        if self.options.prevent_duplicates && self.highlight_duplicate(&toast, now) {
            tracing::debug!(id = %toast.id, "duplicate toast suppressed");
            self.store.dismiss(toast.id);
            return;
        }

        let item = ItemController::new(&toast, default_duration);
        self.entries.insert(
            0,
            Entry {
                toast,
                item,
                highlight: 0,
            },
        );
    }

    /// Highlights the newest live toast at the same position when `toast`
    /// duplicates it. Returns true when a duplicate was found.
    fn highlight_duplicate(&mut self, toast: &Toast, now: Instant) -> bool {
        let position = self.position_of(toast);
        let default_position = self.options.position;
        let newest = self.entries.iter_mut().find(|entry| {
            !entry.toast.delete
                && !entry.item.is_removed()
                && entry.toast.position.unwrap_or(default_position) == position
        });
        match newest {
            Some(entry) if entry.toast.same_content(toast) => {
                self.highlights += 1;
                entry.highlight = self.highlights;
                entry.item.restart_timer(now);
                true
            }
            _ => false,
        }
    }

    fn poll_theme(&mut self, now: Instant) {
        let interval = Duration::from_millis(THEME_POLL_INTERVAL_MS);
        let due = self
            .last_theme_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.last_theme_poll = Some(now);
            self.theme.poll();
        }
    }

    fn position_of(&self, toast: &Toast) -> Position {
        toast.position.unwrap_or(self.options.position)
    }

    fn allowed_swipes(&self, position: Position) -> Vec<SwipeDirection> {
        self.options
            .swipe_directions
            .clone()
            .unwrap_or_else(|| position.default_swipe_directions())
    }

    /// Stack placement of every entry, aligned with `entries`.
    fn slots(&self) -> Vec<Slot> {
        let gap = self.options.gap();
        let mut tallies: Vec<Tally> = Vec::new();
        let mut slots = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let position = self.position_of(&entry.toast);
            let found = tallies.iter().position(|tally| tally.position == position);
            let group = found.unwrap_or_else(|| {
                tallies.push(Tally {
                    position,
                    len: 0,
                    height: 0.0,
                });
                tallies.len() - 1
            });
            let tally = &mut tallies[group];
            slots.push(Slot {
                position,
                index: tally.len,
                offset: tally.len as f32 * gap + tally.height,
            });
            tally.len += 1;
            tally.height += self.heights.get(&entry.toast.id).unwrap_or(0.0);
        }
        slots
    }

    // =========================================================================
    // Region Events
    // =========================================================================

    pub fn pointer_enter(&mut self) {
        self.hovering = true;
        self.expanded = true;
    }

    pub fn pointer_move(&mut self) {
        self.hovering = true;
        self.expanded = true;
    }

    /// Collapses the stack unless a pointer interaction is in progress.
    pub fn pointer_leave(&mut self) {
        self.hovering = false;
        if !self.interacting {
            self.expanded = false;
        }
    }

    /// Pointer pressed inside the region. Presses on non-dismissible toasts
    /// do not count as interaction.
    pub fn pointer_down(&mut self, target_dismissible: bool) {
        if target_dismissible {
            self.interacting = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.interacting = false;
    }

    pub fn drag_end(&mut self) {
        self.expanded = false;
    }

    /// Handles a document-level key press. Returns true when it was used.
    ///
    /// The hotkey expands the region and raises a focus request; Escape
    /// collapses it while focus is inside, unless hovered or interacting.
    pub fn key_down(&mut self, press: &KeyPress) -> bool {
        let mut handled = false;
        if self.hotkey.matches(press) {
            self.expanded = true;
            self.focus_requested = true;
            handled = true;
        }
        if press.code == ESCAPE && self.focus_within && !self.hovering && !self.interacting {
            self.expanded = false;
            handled = true;
        }
        handled
    }

    /// Focus entered the region from `previous`.
    ///
    /// The element that held focus before is remembered for restoration.
    /// Focus landing on a non-dismissible toast is ignored.
    pub fn focus_in(&mut self, target_dismissible: bool, previous: Option<FocusHandle>) {
        if !target_dismissible {
            return;
        }
        if !self.focus_within {
            self.focus_within = true;
            self.last_focused = previous;
        }
    }

    /// Focus left a region element. Returns the element to restore focus to
    /// when focus left the region entirely.
    pub fn focus_out(&mut self, moving_within: bool) -> Option<FocusHandle> {
        if self.focus_within && !moving_within {
            self.focus_within = false;
            return self.last_focused.take();
        }
        None
    }

    /// True once after the hotkey asked for focus to move into the region.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Detaches from the store. Returns the element to restore focus to.
    pub fn unmount(mut self) -> Option<FocusHandle> {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        tracing::debug!(
            region = self.options.id.as_deref().unwrap_or("default"),
            "toaster unmounted"
        );
        self.focus_within = false;
        self.last_focused.take()
    }

    // =========================================================================
    // Toast Events
    // =========================================================================

    fn with_item<R>(
        &mut self,
        id: &ToastId,
        f: impl FnOnce(&mut ItemController, &Toast, &mut HeightTable, Slot, Instant) -> R,
    ) -> Option<R> {
        let now = self.clock.now();
        let index = self.entries.iter().position(|entry| &entry.toast.id == id)?;
        let slot = *self.slots().get(index)?;
        let entry = &mut self.entries[index];
        Some(f(&mut entry.item, &entry.toast, &mut self.heights, slot, now))
    }

    /// Reports the rendered size of a toast.
    pub fn measure(&mut self, id: &ToastId, measurement: &Measurement) {
        self.with_item(id, |item, toast, heights, slot, _| {
            item.measure(toast, slot.position, measurement, heights);
        });
    }

    /// Pointer pressed on a toast. Returns true when the press was accepted.
    pub fn toast_pointer_down(
        &mut self,
        id: &ToastId,
        button: mouse::Button,
        target: PointerTarget,
        at: Point,
    ) -> bool {
        self.with_item(id, |item, toast, _, slot, now| {
            item.press(toast, button, target, at, slot.offset, now)
        })
        .unwrap_or(false)
    }

    /// Pointer moved over a toast. Returns true when its swipe offset changed.
    pub fn toast_pointer_move(&mut self, id: &ToastId, at: Point) -> bool {
        let selected = self.host.has_text_selection();
        let Some(position) = self
            .entries
            .iter()
            .find(|entry| &entry.toast.id == id)
            .map(|entry| self.position_of(&entry.toast))
        else {
            return false;
        };
        let allowed = self.allowed_swipes(position);
        self.with_item(id, |item, toast, _, _, _| {
            item.drag(toast, at, &allowed, selected)
        })
        .unwrap_or(false)
    }

    /// Pointer released over a toast.
    pub fn toast_pointer_up(&mut self, id: &ToastId) -> Option<SwipeRelease> {
        self.with_item(id, |item, toast, heights, slot, now| {
            item.release(toast, heights, slot.offset, now)
        })
        .flatten()
    }

    pub fn toast_drag_end(&mut self, id: &ToastId) {
        self.with_item(id, |item, _, _, _, _| item.drag_end());
    }

    /// Close button pressed. Returns true when the toast started closing.
    pub fn close(&mut self, id: &ToastId) -> bool {
        self.with_item(id, |item, toast, heights, slot, now| {
            item.close(toast, heights, slot.offset, now)
        })
        .unwrap_or(false)
    }

    /// Cancel button pressed. Returns true when the toast started closing.
    pub fn click_cancel(&mut self, id: &ToastId) -> bool {
        self.with_item(id, |item, toast, heights, slot, now| {
            item.click_cancel(toast, heights, slot.offset, now)
        })
        .unwrap_or(false)
    }

    /// Action button pressed. Returns true when the toast started closing.
    pub fn click_action(&mut self, id: &ToastId) -> bool {
        self.with_item(id, |item, toast, heights, slot, now| {
            item.click_action(toast, heights, slot.offset, now)
        })
        .unwrap_or(false)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Projected toasts, newest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<&Toast> {
        self.entries.iter().map(|entry| &entry.toast).collect()
    }

    /// Controller of a projected toast.
    #[must_use]
    pub fn item(&self, id: &ToastId) -> Option<&ItemController> {
        self.entries
            .iter()
            .find(|entry| &entry.toast.id == id)
            .map(|entry| &entry.item)
    }

    #[must_use]
    pub fn options(&self) -> &ToasterOptions {
        &self.options
    }

    #[must_use]
    pub fn heights(&self) -> &HeightTable {
        &self.heights
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    #[must_use]
    pub fn is_focus_within(&self) -> bool {
        self.focus_within
    }

    #[must_use]
    pub fn theme(&self) -> ResolvedTheme {
        self.theme.resolved()
    }

    /// Writing direction, resolved against the host document when not set.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        resolve_direction(self.options.dir, self.host.as_ref())
    }

    #[must_use]
    pub fn offsets(&self) -> &RegionOffsets {
        &self.offsets
    }

    #[must_use]
    pub fn hotkey(&self) -> &Hotkey {
        &self.hotkey
    }

    /// Accessible label of the region, e.g. `Notifications alt+T`.
    #[must_use]
    pub fn aria_label(&self) -> String {
        if let Some(label) = &self.options.custom_aria_label {
            return label.clone();
        }
        let container = self
            .options
            .container_aria_label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_CONTAINER_ARIA_LABEL);
        format!("{container} {}", self.hotkey.label())
    }

    /// Snapshot of every position group, default position first.
    #[must_use]
    pub fn view(&self) -> Vec<PositionGroup> {
        let slots = self.slots();
        let mut positions = vec![self.options.position];
        for slot in &slots {
            if !positions.contains(&slot.position) {
                positions.push(slot.position);
            }
        }

        positions
            .into_iter()
            .map(|position| {
                let members: Vec<(&Entry, &Slot)> = self
                    .entries
                    .iter()
                    .zip(&slots)
                    .filter(|(_, slot)| slot.position == position)
                    .collect();
                let len = members.len();
                PositionGroup {
                    position,
                    toasts: members
                        .into_iter()
                        .map(|(entry, slot)| self.toast_view(entry, slot, len))
                        .collect(),
                    front_toast_height: self.heights.front_height(position),
                    gap: self.options.gap(),
                    width: TOAST_WIDTH_PX,
                }
            })
            .collect()
    }

    fn toast_view(&self, entry: &Entry, slot: &Slot, group_len: usize) -> ToastView {
        let toast = &entry.toast;
        let item = &entry.item;
        let defaults = &self.options.toast_defaults;

        let close_button = toast
            .close_button
            .or(defaults.close_button)
            .unwrap_or(self.options.close_button)
            && toast.custom.is_none()
            && toast.toast_type != ToastType::Loading;
        let styled = !(toast.custom.is_some()
            || toast.unstyled.unwrap_or(false)
            || defaults.unstyled);
        let mut style = defaults.style.clone().unwrap_or_default();
        if let Some(own) = &toast.style {
            style.extend(own.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        ToastView {
            toast: toast.clone(),
            position: slot.position,
            index: slot.index,
            front: slot.index == 0,
            visible: slot.index < self.options.visible_toasts(),
            mounted: item.is_mounted(),
            removed: item.is_removed(),
            swiping: item.is_swiping(),
            swiped: item.is_swiped(),
            swipe_out: item.swipe_out(),
            swipe_amount: item.swipe_amount(),
            expanded: self.expanded || (self.options.expand && item.is_mounted()),
            dismissible: toast.dismissible,
            toast_type: toast.toast_type,
            rich_colors: toast.rich_colors.unwrap_or(self.options.rich_colors),
            invert: toast.invert.unwrap_or(false) || self.options.invert,
            styled,
            close_button,
            close_button_aria_label: defaults
                .close_button_aria_label
                .clone()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| DEFAULT_CLOSE_BUTTON_ARIA_LABEL.to_string()),
            offset: item.render_offset(slot.offset),
            initial_height: (!self.options.expand).then(|| item.initial_height()),
            z_index: group_len - slot.index,
            highlight: entry.highlight,
            class_name: join_classes(defaults.class_name.as_deref(), toast.class_name.as_deref()),
            description_class_name: join_classes(
                defaults.description_class_name.as_deref(),
                toast.description_class_name.as_deref(),
            ),
            style,
        }
    }
}

impl std::fmt::Debug for Toaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toaster")
            .field("id", &self.options.id)
            .field("toasts", &self.entries.len())
            .field("expanded", &self.expanded)
            .field("interacting", &self.interacting)
            .finish_non_exhaustive()
    }
}

fn join_classes(region: Option<&str>, toast: Option<&str>) -> Option<String> {
    let joined = [region, toast]
        .into_iter()
        .flatten()
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::FrameQueue;
    use crate::test_utils::assert_abs_diff_eq;
    use crate::toast::ToastOptions;
    use iced_core::keyboard::Modifiers;

    const MS: Duration = Duration::from_millis(1);

    struct Fixture {
        frames: FrameQueue,
        store: Store,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new() -> Self {
            let frames = FrameQueue::new();
            Self {
                store: Store::with_scheduler(Arc::new(frames.clone())),
                frames,
                clock: Arc::new(ManualClock::new()),
            }
        }

        fn toaster(&self, options: ToasterOptions) -> Toaster {
            Toaster::builder(self.store.clone(), options)
                .clock(self.clock.clone())
                .probe(Arc::new(SimulatedProbe::new(false)))
                .build()
        }
    }

    fn ids(toaster: &Toaster) -> Vec<ToastId> {
        toaster.toasts().iter().map(|toast| toast.id.clone()).collect()
    }

    #[test]
    fn new_toasts_are_prepended() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let first = fx.store.message("one", ToastOptions::new());
        let second = fx.store.message("two", ToastOptions::new());
        toaster.tick();
        assert_eq!(ids(&toaster), vec![second, first]);
    }

    #[test]
    fn updates_merge_in_place() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        fx.store.message("one", ToastOptions::new().id("a"));
        fx.store.message("two", ToastOptions::new().id("b"));
        toaster.tick();
        fx.store.success("updated", ToastOptions::new().id("a"));
        toaster.tick();

        assert_eq!(ids(&toaster), vec![ToastId::from("b"), ToastId::from("a")]);
        assert_eq!(toaster.toasts()[1].toast_type, ToastType::Success);
    }

    #[test]
    fn regions_only_show_their_toasts() {
        let fx = Fixture::new();
        let mut unnamed = fx.toaster(ToasterOptions::default());
        let mut sidebar = fx.toaster(ToasterOptions::default().with_id("sidebar"));

        let plain = fx.store.message("plain", ToastOptions::new());
        let routed = fx
            .store
            .message("routed", ToastOptions::new().toaster_id("sidebar"));
        unnamed.tick();
        sidebar.tick();

        assert_eq!(ids(&unnamed), vec![plain]);
        assert_eq!(ids(&sidebar), vec![routed]);
    }

    #[test]
    fn tombstone_marks_delete_one_frame_later() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let id = fx.store.message("bye", ToastOptions::new());
        toaster.tick();

        fx.store.dismiss(id.clone());
        fx.frames.run_frame();
        toaster.tick();
        assert!(!toaster.toasts()[0].delete);

        toaster.tick();
        assert!(toaster.toasts()[0].delete);
        assert!(toaster.item(&id).is_some_and(ItemController::is_removed));

        fx.clock.advance(200 * MS);
        toaster.tick();
        assert!(toaster.toasts().is_empty());
    }

    #[test]
    fn removal_after_local_close_dismisses_in_store() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let id = fx.store.message("close me", ToastOptions::new());
        toaster.tick();

        assert!(toaster.close(&id));
        fx.clock.advance(200 * MS);
        toaster.tick();

        assert!(toaster.toasts().is_empty());
        assert!(fx.store.is_dismissed(&id));
    }

    #[test]
    fn auto_close_timing() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let id = fx
            .store
            .message("short", ToastOptions::new().duration(20 * MS));
        toaster.tick();

        fx.clock.advance(19 * MS);
        toaster.tick();
        assert!(!toaster.item(&id).is_some_and(ItemController::is_removed));

        fx.clock.advance(MS);
        toaster.tick();
        assert!(toaster.item(&id).is_some_and(ItemController::is_removed));

        fx.clock.advance(199 * MS);
        toaster.tick();
        assert_eq!(toaster.toasts().len(), 1);

        fx.clock.advance(MS);
        toaster.tick();
        assert!(toaster.toasts().is_empty());
    }

    #[test]
    fn hover_pauses_timers_and_single_toast_collapses() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let id = fx
            .store
            .message("one", ToastOptions::new().duration(50 * MS));
        fx.store.message("two", ToastOptions::new());
        toaster.tick();

        toaster.pointer_enter();
        toaster.tick();
        assert!(toaster.is_expanded());
        assert_eq!(toaster.item(&id).map(ItemController::phase), Some(Phase::Paused));

        fx.clock.advance(500 * MS);
        toaster.tick();
        assert!(!toaster.item(&id).is_some_and(ItemController::is_removed));

        toaster.pointer_leave();
        assert!(!toaster.is_expanded());
    }

    #[test]
    fn pointer_leave_keeps_expanded_while_interacting() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        toaster.pointer_enter();
        toaster.pointer_down(true);
        toaster.pointer_leave();
        assert!(toaster.is_expanded());

        toaster.pointer_up();
        toaster.drag_end();
        assert!(!toaster.is_expanded());
    }

    #[test]
    fn non_dismissible_press_is_not_interaction() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        toaster.pointer_down(false);
        assert!(!toaster.is_interacting());
    }

    #[test]
    fn hotkey_expands_and_requests_focus() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        assert!(toaster.key_down(&KeyPress::new("KeyT", Modifiers::ALT)));
        assert!(toaster.is_expanded());
        assert!(toaster.take_focus_request());
        assert!(!toaster.take_focus_request());
    }

    #[test]
    fn escape_collapses_only_with_focus_inside() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        toaster.key_down(&KeyPress::new("KeyT", Modifiers::ALT));

        assert!(!toaster.key_down(&KeyPress::new(ESCAPE, Modifiers::empty())));
        assert!(toaster.is_expanded());

        toaster.focus_in(true, Some(FocusHandle(7)));
        assert!(toaster.key_down(&KeyPress::new(ESCAPE, Modifiers::empty())));
        assert!(!toaster.is_expanded());
    }

    #[test]
    fn focus_restores_previous_element() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        toaster.focus_in(false, Some(FocusHandle(1)));
        assert!(!toaster.is_focus_within());

        toaster.focus_in(true, Some(FocusHandle(2)));
        toaster.focus_in(true, Some(FocusHandle(3)));
        assert_eq!(toaster.focus_out(true), None);
        assert_eq!(toaster.focus_out(false), Some(FocusHandle(2)));

        toaster.focus_in(true, Some(FocusHandle(4)));
        assert_eq!(toaster.unmount(), Some(FocusHandle(4)));
    }

    #[test]
    fn unmount_detaches_from_store() {
        let fx = Fixture::new();
        let toaster = fx.toaster(ToasterOptions::default());
        assert_eq!(fx.store.subscriber_count(), 1);
        toaster.unmount();
        assert_eq!(fx.store.subscriber_count(), 0);
    }

    #[test]
    fn groups_split_by_position_with_default_first() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        fx.store
            .message("top", ToastOptions::new().position(Position::TopLeft));
        fx.store.message("default", ToastOptions::new());
        fx.store
            .message("explicit", ToastOptions::new().position(Position::BottomRight));
        toaster.tick();

        let groups = toaster.view();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].position, Position::BottomRight);
        assert_eq!(groups[0].toasts.len(), 2);
        assert_eq!(groups[1].position, Position::TopLeft);
        assert_eq!(groups[1].toasts[0].z_index, 1);
    }

    #[test]
    fn offsets_stack_heights_and_gap() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let older = fx.store.message("older", ToastOptions::new());
        let newer = fx.store.message("newer", ToastOptions::new());
        toaster.tick();
        toaster.measure(&older, &Measurement::new(70.0));
        toaster.measure(&newer, &Measurement::new(50.0));

        let group = &toaster.view()[0];
        assert_abs_diff_eq!(group.toasts[0].offset, 0.0);
        assert_abs_diff_eq!(group.toasts[1].offset, 64.0);
        assert_abs_diff_eq!(group.front_toast_height, 50.0);
        assert!(group.toasts[0].front);
    }

    #[test]
    fn duplicates_are_suppressed_and_highlighted() {
        let fx = Fixture::new();
        let options = ToasterOptions {
            prevent_duplicates: true,
            ..ToasterOptions::default()
        };
        let mut toaster = fx.toaster(options);
        let first = fx.store.error("Network down", ToastOptions::new());
        toaster.tick();
        fx.store.error("Network down", ToastOptions::new());
        fx.store.info("Network down", ToastOptions::new());
        toaster.tick();

        assert_eq!(toaster.toasts().len(), 2);
        let group = &toaster.view()[0];
        let original = group
            .toasts
            .iter()
            .find(|view| view.toast.id == first)
            .map(|view| view.highlight);
        assert_eq!(original, Some(1));
    }

    #[test]
    fn suppressed_duplicates_leave_no_active_toast_behind() {
        let fx = Fixture::new();
        let options = ToasterOptions {
            prevent_duplicates: true,
            ..ToasterOptions::default()
        };
        let mut toaster = fx.toaster(options);
        let first = fx
            .store
            .error("Network down", ToastOptions::new().duration(20 * MS));
        toaster.tick();
        let second = fx
            .store
            .error("Network down", ToastOptions::new().duration(20 * MS));
        toaster.tick();

        assert_eq!(ids(&toaster), vec![first.clone()]);
        assert!(fx.store.is_dismissed(&second));

        fx.clock.advance(20 * MS);
        toaster.tick();
        fx.clock.advance(200 * MS);
        toaster.tick();
        fx.frames.run_frame();
        toaster.tick();

        assert!(toaster.toasts().is_empty());
        assert!(fx.store.is_dismissed(&first));
        assert!(fx.store.get_active_toasts().is_empty());
    }

    #[test]
    fn retargeted_toast_leaves_its_old_region() {
        let fx = Fixture::new();
        let mut unnamed = fx.toaster(ToasterOptions::default());
        let mut sidebar = fx.toaster(ToasterOptions::default().with_id("sidebar"));
        let id = fx.store.message("moving", ToastOptions::new().id("m"));
        unnamed.tick();
        sidebar.tick();
        assert_eq!(ids(&unnamed), vec![id.clone()]);

        fx.store
            .message("moving", ToastOptions::new().id("m").toaster_id("sidebar"));
        unnamed.tick();
        sidebar.tick();

        assert!(unnamed.toasts().is_empty());
        assert!(unnamed.heights().get(&id).is_none());
        assert_eq!(ids(&sidebar), vec![id]);
    }

    #[test]
    fn closing_entry_is_replaced_by_recreated_toast() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        let id = fx.store.message("first", ToastOptions::new().id("x"));
        toaster.tick();
        toaster.close(&id);

        fx.store.message("again", ToastOptions::new().id("x"));
        toaster.tick();

        let item = toaster.item(&id);
        assert!(item.is_some_and(|item| !item.is_removed()));
        assert_eq!(toaster.toasts()[0].title, Some("again".into()));
    }

    #[test]
    fn view_flags_follow_options() {
        let fx = Fixture::new();
        let options = ToasterOptions {
            close_button: true,
            rich_colors: true,
            invert: true,
            expand: true,
            ..ToasterOptions::default()
        };
        let mut toaster = fx.toaster(options);
        fx.store.message("plain", ToastOptions::new().class_name("mine"));
        fx.store.loading("busy", ToastOptions::new());
        toaster.tick();

        let group = &toaster.view()[0];
        let loading = &group.toasts[0];
        let plain = &group.toasts[1];
        assert!(!loading.close_button);
        assert!(plain.close_button && plain.rich_colors && plain.invert && plain.styled);
        assert!(plain.expanded);
        assert_eq!(plain.initial_height, None);
        assert_eq!(plain.class_name.as_deref(), Some("mine"));
        assert_eq!(plain.close_button_aria_label, "Close toast");
    }

    #[test]
    fn aria_label_uses_hotkey_label() {
        let fx = Fixture::new();
        let toaster = fx.toaster(ToasterOptions::default());
        assert_eq!(toaster.aria_label(), "Notifications alt+T");

        let custom = fx.toaster(ToasterOptions {
            custom_aria_label: Some("Alerts".into()),
            ..ToasterOptions::default()
        });
        assert_eq!(custom.aria_label(), "Alerts");
    }

    #[test]
    fn system_theme_follows_probe() {
        let fx = Fixture::new();
        let probe = Arc::new(SimulatedProbe::legacy(true));
        let toaster = Toaster::builder(
            fx.store.clone(),
            ToasterOptions {
                theme: ThemeMode::System,
                ..ToasterOptions::default()
            },
        )
        .clock(fx.clock.clone())
        .probe(probe.clone())
        .build();

        assert_eq!(toaster.theme(), ResolvedTheme::Dark);
        probe.set_dark(false);
        assert_eq!(toaster.theme(), ResolvedTheme::Light);
        drop(toaster);
        assert_eq!(probe.listener_count(), 0);
    }

    #[test]
    fn next_deadline_tracks_timers_and_queued_events() {
        let fx = Fixture::new();
        let mut toaster = fx.toaster(ToasterOptions::default());
        assert_eq!(toaster.next_deadline(), None);

        fx.store
            .message("soon", ToastOptions::new().duration(30 * MS));
        assert_eq!(toaster.next_deadline(), Some(fx.clock.now()));

        toaster.tick();
        assert_eq!(toaster.next_deadline(), Some(fx.clock.now() + 30 * MS));
    }
}
