// SPDX-License-Identifier: MPL-2.0
//! Caller-facing toast API.
//!
//! [`Toasts`] forwards to one [`Store`]. The free functions of this module
//! operate on a process-wide default store created on first use.
//!
//! ```
//! use toastline::facade;
//! use toastline::toast::ToastOptions;
//!
//! let id = facade::success("Profile saved", ToastOptions::new());
//! assert!(facade::get_toasts().iter().any(|toast| toast.id == id));
//! ```

use crate::store::{PromiseConfig, PromiseHandle, PromiseValue, Store};
use crate::toast::{Content, Toast, ToastId, ToastOptions};
use std::future::Future;
use std::sync::OnceLock;

/// Forwarding API over a store.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    store: Store,
}

impl Toasts {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Plain toast. Same as [`Toasts::message`].
    pub fn toast(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.message(title, options)
    }

    pub fn message(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.message(title, options)
    }

    pub fn success(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.success(title, options)
    }

    pub fn info(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.info(title, options)
    }

    pub fn warning(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.warning(title, options)
    }

    pub fn error(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.error(title, options)
    }

    pub fn loading(&self, title: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.store.loading(title, options)
    }

    /// Toast whose body is rendered by `producer`, which receives the id.
    pub fn custom<F>(&self, producer: F, options: ToastOptions) -> ToastId
    where
        F: FnOnce(&ToastId) -> Content,
    {
        self.store.custom(producer, options)
    }

    pub fn dismiss(&self, id: impl Into<ToastId>) -> ToastId {
        self.store.dismiss(id)
    }

    pub fn dismiss_all(&self) {
        self.store.dismiss_all();
    }

    /// Binds a toast to `operation`. See [`Store::promise`].
    pub fn promise<T, E, Fut>(
        &self,
        operation: Fut,
        config: Option<PromiseConfig<T, E>>,
    ) -> Option<PromiseHandle<T, E>>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: PromiseValue + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        self.store.promise(operation, config)
    }

    #[must_use]
    pub fn get_history(&self) -> Vec<Toast> {
        self.store.get_history()
    }

    /// Active toasts.
    #[must_use]
    pub fn get_toasts(&self) -> Vec<Toast> {
        self.store.get_active_toasts()
    }
}

impl From<Store> for Toasts {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}

static DEFAULT_STORE: OnceLock<Store> = OnceLock::new();

/// The process-wide store used by the free functions.
pub fn default_store() -> &'static Store {
    DEFAULT_STORE.get_or_init(|| {
        tracing::debug!("default toast store created");
        Store::new()
    })
}

fn defaults() -> Toasts {
    Toasts::new(default_store().clone())
}

/// Plain toast on the default store.
pub fn toast(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().toast(title, options)
}

pub fn message(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().message(title, options)
}

pub fn success(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().success(title, options)
}

pub fn info(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().info(title, options)
}

pub fn warning(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().warning(title, options)
}

pub fn error(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().error(title, options)
}

pub fn loading(title: impl Into<Content>, options: ToastOptions) -> ToastId {
    defaults().loading(title, options)
}

pub fn custom<F>(producer: F, options: ToastOptions) -> ToastId
where
    F: FnOnce(&ToastId) -> Content,
{
    defaults().custom(producer, options)
}

pub fn dismiss(id: impl Into<ToastId>) -> ToastId {
    defaults().dismiss(id)
}

pub fn dismiss_all() {
    defaults().dismiss_all();
}

pub fn promise<T, E, Fut>(
    operation: Fut,
    config: Option<PromiseConfig<T, E>>,
) -> Option<PromiseHandle<T, E>>
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: PromiseValue + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    defaults().promise(operation, config)
}

pub fn get_history() -> Vec<Toast> {
    defaults().get_history()
}

pub fn get_toasts() -> Vec<Toast> {
    defaults().get_toasts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frame_store;
    use crate::toast::ToastType;

    fn toasts() -> Toasts {
        let (_, store) = frame_store();
        Toasts::new(store)
    }

    #[test]
    fn toast_is_message() {
        let toasts = toasts();
        let id = toasts.toast("hello", ToastOptions::new());
        let history = toasts.get_history();
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].toast_type, ToastType::Normal);
    }

    #[test]
    fn typed_shorthands_set_type() {
        let toasts = toasts();
        toasts.success("a", ToastOptions::new());
        toasts.info("b", ToastOptions::new());
        toasts.warning("c", ToastOptions::new());
        toasts.error("d", ToastOptions::new());
        toasts.loading("e", ToastOptions::new());

        let types: Vec<ToastType> = toasts
            .get_toasts()
            .iter()
            .map(|toast| toast.toast_type)
            .collect();
        assert_eq!(
            types,
            vec![
                ToastType::Success,
                ToastType::Info,
                ToastType::Warning,
                ToastType::Error,
                ToastType::Loading
            ]
        );
    }

    #[test]
    fn custom_receives_allocated_id() {
        let toasts = toasts();
        let id = toasts.custom(
            |id| Content::from(format!("custom {id}")),
            ToastOptions::new(),
        );
        let toast = &toasts.get_toasts()[0];
        assert_eq!(toast.id, id);
        assert_eq!(toast.custom, Some(Content::from(format!("custom {id}"))));
        assert!(toast.title.is_none());
    }

    #[test]
    fn dismiss_hides_from_active_but_keeps_history() {
        let toasts = toasts();
        let id = toasts.message("gone", ToastOptions::new());
        toasts.dismiss(id);
        assert!(toasts.get_toasts().is_empty());
        assert_eq!(toasts.get_history().len(), 1);
    }

    #[test]
    fn default_store_is_shared() {
        let id = toast("global", ToastOptions::new().id("facade-shared"));
        assert!(std::ptr::eq(default_store(), default_store()));
        assert!(get_history().iter().any(|toast| toast.id == id));
    }
}
