// SPDX-License-Identifier: MPL-2.0
//! Toast records, caller-facing options and store events.

use super::content::{ActionSlot, Content};
use super::id::ToastId;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Inline style overrides (property name to CSS value).
pub type Style = BTreeMap<String, String>;

/// Kind of toast. Determines icon and styling in the rendering layer and
/// whether the toast auto-closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    #[default]
    Normal,
    Action,
    Success,
    Info,
    Warning,
    Error,
    Loading,
    Default,
}

impl ToastType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastType::Normal => "normal",
            ToastType::Action => "action",
            ToastType::Success => "success",
            ToastType::Info => "info",
            ToastType::Warning => "warning",
            ToastType::Error => "error",
            ToastType::Loading => "loading",
            ToastType::Default => "default",
        }
    }
}

impl fmt::Display for ToastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen placement of a toast stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopCenter => "top-center",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomCenter => "bottom-center",
            Position::BottomRight => "bottom-right",
        }
    }

    /// Vertical part of the position name (`top` or `bottom`).
    #[must_use]
    pub fn y(&self) -> &'static str {
        match self {
            Position::TopLeft | Position::TopCenter | Position::TopRight => "top",
            _ => "bottom",
        }
    }

    /// Horizontal part of the position name (`left`, `center` or `right`).
    #[must_use]
    pub fn x(&self) -> &'static str {
        match self {
            Position::TopLeft | Position::BottomLeft => "left",
            Position::TopCenter | Position::BottomCenter => "center",
            Position::TopRight | Position::BottomRight => "right",
        }
    }

    /// Swipe directions derived from the position name.
    ///
    /// Centered positions only allow the vertical direction.
    #[must_use]
    pub fn default_swipe_directions(&self) -> Vec<SwipeDirection> {
        [self.y(), self.x()]
            .into_iter()
            .filter_map(|part| part.parse().ok())
            .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|position| position.as_str() == s)
            .ok_or_else(|| Error::UnknownValue {
                field: "position",
                value: s.to_string(),
            })
    }
}

/// Direction in which a toast may be swiped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Top,
    Right,
    Bottom,
    Left,
}

impl FromStr for SwipeDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(SwipeDirection::Top),
            "right" => Ok(SwipeDirection::Right),
            "bottom" => Ok(SwipeDirection::Bottom),
            "left" => Ok(SwipeDirection::Left),
            other => Err(Error::UnknownValue {
                field: "swipe direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle callback receiving the toast it fired for.
#[derive(Clone)]
pub struct ToastCallback(Arc<dyn Fn(&Toast) + Send + Sync>);

impl ToastCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Toast) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub fn call(&self, toast: &Toast) {
        (self.0)(toast);
    }
}

impl PartialEq for ToastCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ToastCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ToastCallback(..)")
    }
}

/// A toast as held by the store and published to regions.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    /// Region routing id. `None` targets the unnamed region.
    pub toaster_id: Option<String>,
    pub title: Option<Content>,
    pub toast_type: ToastType,
    pub description: Option<Content>,
    pub icon: Option<Content>,
    /// Caller-rendered body replacing the title.
    pub custom: Option<Content>,
    pub action: Option<ActionSlot>,
    pub cancel: Option<ActionSlot>,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub dismissible: bool,
    pub rich_colors: Option<bool>,
    pub close_button: Option<bool>,
    pub invert: Option<bool>,
    pub unstyled: Option<bool>,
    pub class_name: Option<String>,
    pub description_class_name: Option<String>,
    pub style: Option<Style>,
    pub test_id: Option<String>,
    /// Bound to an in-flight promise.
    pub promise: bool,
    /// Pending removal, set by regions when a tombstone arrives.
    pub delete: bool,
    pub on_dismiss: Option<ToastCallback>,
    pub on_auto_close: Option<ToastCallback>,
}

impl Toast {
    /// Creates an empty, dismissible toast.
    pub fn new(id: impl Into<ToastId>) -> Self {
        Self {
            id: id.into(),
            toaster_id: None,
            title: None,
            toast_type: ToastType::Normal,
            description: None,
            icon: None,
            custom: None,
            action: None,
            cancel: None,
            duration: None,
            position: None,
            dismissible: true,
            rich_colors: None,
            close_button: None,
            invert: None,
            unstyled: None,
            class_name: None,
            description_class_name: None,
            style: None,
            test_id: None,
            promise: false,
            delete: false,
            on_dismiss: None,
            on_auto_close: None,
        }
    }

    /// Builds a fresh record from caller options.
    pub(crate) fn from_options(id: ToastId, options: ToastOptions) -> Self {
        let mut toast = Toast::new(id);
        toast.apply(options);
        toast
    }

    /// Merges caller options into this record.
    ///
    /// Present fields overwrite. The title is always replaced and
    /// `dismissible` is recomputed, defaulting to `true`.
    pub(crate) fn apply(&mut self, options: ToastOptions) {
        let ToastOptions {
            id: _,
            toaster_id,
            title,
            toast_type,
            description,
            icon,
            custom,
            action,
            cancel,
            duration,
            position,
            dismissible,
            rich_colors,
            close_button,
            invert,
            unstyled,
            class_name,
            description_class_name,
            style,
            test_id,
            promise,
            on_dismiss,
            on_auto_close,
        } = options;

        self.title = title;
        self.dismissible = dismissible.unwrap_or(true);

        overwrite(&mut self.toaster_id, toaster_id);
        overwrite(&mut self.description, description);
        overwrite(&mut self.icon, icon);
        overwrite(&mut self.custom, custom);
        overwrite(&mut self.action, action);
        overwrite(&mut self.cancel, cancel);
        overwrite(&mut self.duration, duration.filter(|d| !d.is_zero()));
        overwrite(&mut self.position, position);
        overwrite(&mut self.rich_colors, rich_colors);
        overwrite(&mut self.close_button, close_button);
        overwrite(&mut self.invert, invert);
        overwrite(&mut self.unstyled, unstyled);
        overwrite(&mut self.class_name, class_name);
        overwrite(&mut self.description_class_name, description_class_name);
        overwrite(&mut self.style, style);
        overwrite(&mut self.test_id, test_id);
        overwrite(&mut self.on_dismiss, on_dismiss);
        overwrite(&mut self.on_auto_close, on_auto_close);

        if let Some(toast_type) = toast_type {
            self.toast_type = toast_type;
        }
        if let Some(promise) = promise {
            self.promise = promise;
        }
    }

    /// True when the toast never auto-closes on its own.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.duration == Some(crate::config::defaults::INFINITE)
    }

    /// Content fields compared by duplicate prevention.
    #[must_use]
    pub fn same_content(&self, other: &Toast) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.custom == other.custom
            && self.action == other.action
            && self.cancel == other.cancel
            && self.toast_type == other.toast_type
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Caller-facing toast input. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastOptions {
    pub id: Option<ToastId>,
    pub toaster_id: Option<String>,
    pub title: Option<Content>,
    pub toast_type: Option<ToastType>,
    pub description: Option<Content>,
    pub icon: Option<Content>,
    pub custom: Option<Content>,
    pub action: Option<ActionSlot>,
    pub cancel: Option<ActionSlot>,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub dismissible: Option<bool>,
    pub rich_colors: Option<bool>,
    pub close_button: Option<bool>,
    pub invert: Option<bool>,
    pub unstyled: Option<bool>,
    pub class_name: Option<String>,
    pub description_class_name: Option<String>,
    pub style: Option<Style>,
    pub test_id: Option<String>,
    pub promise: Option<bool>,
    pub on_dismiss: Option<ToastCallback>,
    pub on_auto_close: Option<ToastCallback>,
}

impl ToastOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Routes the toast to the region with this id.
    #[must_use]
    pub fn toaster_id(mut self, toaster_id: impl Into<String>) -> Self {
        self.toaster_id = Some(toaster_id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<Content>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn toast_type(mut self, toast_type: ToastType) -> Self {
        self.toast_type = Some(toast_type);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<Content>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<Content>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn custom(mut self, custom: impl Into<Content>) -> Self {
        self.custom = Some(custom.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<ActionSlot>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn cancel(mut self, cancel: impl Into<ActionSlot>) -> Self {
        self.cancel = Some(cancel.into());
        self
    }

    /// Sets the auto-close delay. Use [`crate::config::defaults::INFINITE`]
    /// to keep the toast until dismissed.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    #[must_use]
    pub fn rich_colors(mut self, rich_colors: bool) -> Self {
        self.rich_colors = Some(rich_colors);
        self
    }

    #[must_use]
    pub fn close_button(mut self, close_button: bool) -> Self {
        self.close_button = Some(close_button);
        self
    }

    #[must_use]
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = Some(invert);
        self
    }

    #[must_use]
    pub fn unstyled(mut self, unstyled: bool) -> Self {
        self.unstyled = Some(unstyled);
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn description_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.description_class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(Style::new)
            .insert(property.into(), value.into());
        self
    }

    #[must_use]
    pub fn test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    #[must_use]
    pub fn on_dismiss<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Toast) + Send + Sync + 'static,
    {
        self.on_dismiss = Some(ToastCallback::new(callback));
        self
    }

    #[must_use]
    pub fn on_auto_close<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Toast) + Send + Sync + 'static,
    {
        self.on_auto_close = Some(ToastCallback::new(callback));
        self
    }

    /// Overlays `other` on top of `self`: present fields in `other` win.
    #[must_use]
    pub fn overlay(mut self, other: ToastOptions) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            id,
            toaster_id,
            title,
            toast_type,
            description,
            icon,
            custom,
            action,
            cancel,
            duration,
            position,
            dismissible,
            rich_colors,
            close_button,
            invert,
            unstyled,
            class_name,
            description_class_name,
            style,
            test_id,
            promise,
            on_dismiss,
            on_auto_close,
        );
        self
    }
}

/// An event published by the store to every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    /// A created or updated toast record.
    Upsert(Toast),
    /// Tombstone: the toast with this id should be removed.
    Dismiss { id: ToastId },
}

impl ToastEvent {
    #[must_use]
    pub fn id(&self) -> &ToastId {
        match self {
            ToastEvent::Upsert(toast) => &toast.id,
            ToastEvent::Dismiss { id } => id,
        }
    }

    #[must_use]
    pub fn is_dismiss(&self) -> bool {
        matches!(self, ToastEvent::Dismiss { .. })
    }
}
