// SPDX-License-Identifier: MPL-2.0
//! Renderable content slots and action buttons.
//!
//! The core never renders anything itself. Titles, descriptions, icons and
//! custom bodies are carried as [`Content`] and handed to the rendering
//! layer untouched.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Producer = Arc<dyn Fn() -> String + Send + Sync>;
type ClickHandler = Arc<dyn Fn(&mut ClickEvent) + Send + Sync>;

/// A renderable value held by a toast.
#[derive(Clone)]
pub enum Content {
    /// Static text.
    Text(String),
    /// Zero-argument producer evaluated each time the content is read.
    Lazy(Producer),
    /// Opaque value understood only by the rendering layer.
    Node(Arc<dyn Any + Send + Sync>),
}

impl Content {
    /// Creates lazily produced content.
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Content::Lazy(Arc::new(producer))
    }

    /// Wraps an opaque renderable value.
    pub fn node<T: Any + Send + Sync>(value: T) -> Self {
        Content::Node(Arc::new(value))
    }

    /// Resolves the content to text, calling the producer for lazy content.
    ///
    /// Returns `None` for opaque nodes.
    #[must_use]
    pub fn resolve_text(&self) -> Option<String> {
        match self {
            Content::Text(text) => Some(text.clone()),
            Content::Lazy(producer) => Some(producer()),
            Content::Node(_) => None,
        }
    }

    /// Returns the static text, if this is static text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Downcasts an opaque node.
    #[must_use]
    pub fn downcast_node<T: Any>(&self) -> Option<&T> {
        match self {
            Content::Node(node) => node.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::Text(a), Content::Text(b)) => a == b,
            (Content::Lazy(a), Content::Lazy(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Content::Node(a), Content::Node(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Lazy(_) => f.write_str("Lazy(..)"),
            Content::Node(_) => f.write_str("Node(..)"),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_owned())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<&String> for Content {
    fn from(value: &String) -> Self {
        Content::Text(value.clone())
    }
}

impl PartialEq<&str> for Content {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

/// Click event passed to action and cancel callbacks.
#[derive(Debug, Default)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the toast open after an action click.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// An interactive button: a label plus a click callback.
#[derive(Clone)]
pub struct Action {
    pub label: Content,
    on_click: ClickHandler,
}

impl Action {
    pub fn new<F>(label: impl Into<Content>, on_click: F) -> Self
    where
        F: Fn(&mut ClickEvent) + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            on_click: Arc::new(on_click),
        }
    }

    /// Invokes the callback and returns the event after it ran.
    pub fn click(&self) -> ClickEvent {
        let mut event = ClickEvent::new();
        (self.on_click)(&mut event);
        event
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && std::ptr::addr_eq(Arc::as_ptr(&self.on_click), Arc::as_ptr(&other.on_click))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The value of a toast's `action` or `cancel` slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSlot {
    /// Rendered as a button with built-in click handling.
    Button(Action),
    /// Rendered as-is, without click handling.
    Content(Content),
}

impl ActionSlot {
    /// Returns the action when the slot holds an interactive button.
    #[must_use]
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            ActionSlot::Button(action) => Some(action),
            ActionSlot::Content(_) => None,
        }
    }
}

impl From<Action> for ActionSlot {
    fn from(action: Action) -> Self {
        ActionSlot::Button(action)
    }
}

impl From<Content> for ActionSlot {
    fn from(content: Content) -> Self {
        ActionSlot::Content(content)
    }
}
