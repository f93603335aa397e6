// SPDX-License-Identifier: MPL-2.0
//! Promise binder: ties a toast to the outcome of an async operation.
//!
//! A loading toast is created up front (when configured), the operation is
//! awaited on a spawned task, and its outcome is classified into one of the
//! [`Classification`] variants before the toast is updated in place.
//!
//! # Example
//!
//! ```
//! use toastline::store::{PromiseConfig, Store};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Store::new();
//! let handle = store
//!     .promise(
//!         async { Ok::<_, String>(3_u32) },
//!         Some(
//!             PromiseConfig::new()
//!                 .loading("Loading...")
//!                 .success_with(|count: &u32| format!("{count} files copied")),
//!         ),
//!     )
//!     .expect("config supplied");
//!
//! assert_eq!(handle.unwrap().await, Ok(3));
//! # }
//! ```

use super::Store;
use crate::toast::{Content, ToastId, ToastOptions, ToastType};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;

// ==========================================================================
// Outcome Classification
// ==========================================================================

/// Toast content fully customizing a settled promise toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedResult {
    pub message: Content,
    pub options: ToastOptions,
}

impl ExtendedResult {
    pub fn new(message: impl Into<Content>) -> Self {
        Self {
            message: message.into(),
            options: ToastOptions::default(),
        }
    }

    /// Adds per-toast overrides applied on top of the terminal update.
    #[must_use]
    pub fn with_options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<Content> for ExtendedResult {
    fn from(message: Content) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ExtendedResult {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ExtendedResult {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// The `ok`/`status` pair of an HTTP-like response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatus {
    pub ok: bool,
    pub status: u16,
}

/// Minimal HTTP response value recognized by the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

impl HttpResponse {
    /// Creates a response; `ok` follows the 2xx range.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            ok: (200..300).contains(&status),
            body: body.into(),
        }
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)
    }
}

/// Describes how a resolved value should drive the promise toast.
pub trait PromiseValue {
    /// Full toast override carried by the value.
    fn as_extended_result(&self) -> Option<ExtendedResult> {
        None
    }

    /// HTTP status when the value behaves like a response.
    fn http_status(&self) -> Option<HttpStatus> {
        None
    }

    /// True when the value is an error that resolved instead of rejecting.
    fn is_error(&self) -> bool {
        false
    }
}

/// Tagged outcome of a resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    ExtendedResult(ExtendedResult),
    FailedResponse { status: u16 },
    ErrorValue,
    SuccessValue,
}

/// Classifies a resolved value.
///
/// Checks run in a fixed order: extended result, failed response, error
/// value, and finally plain success.
pub fn classify<T: PromiseValue + ?Sized>(value: &T) -> Classification {
    if let Some(result) = value.as_extended_result() {
        return Classification::ExtendedResult(result);
    }
    if let Some(HttpStatus { ok: false, status }) = value.http_status() {
        return Classification::FailedResponse { status };
    }
    if value.is_error() {
        return Classification::ErrorValue;
    }
    Classification::SuccessValue
}

macro_rules! plain_success {
    ($($ty:ty),* $(,)?) => {
        $(impl PromiseValue for $ty {})*
    };
}

plain_success!(
    (),
    bool,
    char,
    String,
    u8,
    u16,
    u32,
    u64,
    usize,
    i8,
    i16,
    i32,
    i64,
    isize,
    f32,
    f64
);

impl PromiseValue for &str {}

impl<T> PromiseValue for Vec<T> {}

impl PromiseValue for ExtendedResult {
    fn as_extended_result(&self) -> Option<ExtendedResult> {
        Some(self.clone())
    }
}

impl PromiseValue for HttpResponse {
    fn http_status(&self) -> Option<HttpStatus> {
        Some(HttpStatus {
            ok: self.ok,
            status: self.status,
        })
    }
}

impl PromiseValue for Arc<dyn StdError + Send + Sync> {
    fn is_error(&self) -> bool {
        true
    }
}

impl<T: PromiseValue> PromiseValue for Option<T> {
    fn as_extended_result(&self) -> Option<ExtendedResult> {
        self.as_ref().and_then(PromiseValue::as_extended_result)
    }

    fn http_status(&self) -> Option<HttpStatus> {
        self.as_ref().and_then(PromiseValue::http_status)
    }

    fn is_error(&self) -> bool {
        self.as_ref().is_some_and(PromiseValue::is_error)
    }
}

// ==========================================================================
// Resolvers
// ==========================================================================

/// What a resolver is told about the settled operation.
pub enum Settlement<'a, T, E> {
    /// The operation resolved with this value.
    Resolved(&'a T),
    /// The operation resolved with a failed HTTP response.
    HttpFailure(&'a str),
    /// The operation rejected with this error.
    Rejected(&'a E),
}

impl<T, E> Clone for Settlement<'_, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for Settlement<'_, T, E> {}

impl<'a, T, E> Settlement<'a, T, E> {
    #[must_use]
    pub fn resolved(&self) -> Option<&'a T> {
        match *self {
            Settlement::Resolved(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn http_failure(&self) -> Option<&'a str> {
        match *self {
            Settlement::HttpFailure(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn rejected(&self) -> Option<&'a E> {
        match *self {
            Settlement::Rejected(error) => Some(error),
            _ => None,
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Settlement<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Settlement::Resolved(value) => fmt::Display::fmt(value, f),
            Settlement::HttpFailure(message) => f.write_str(message),
            Settlement::Rejected(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Settlement<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Settlement::Resolved(value) => f.debug_tuple("Resolved").field(value).finish(),
            Settlement::HttpFailure(message) => f.debug_tuple("HttpFailure").field(message).finish(),
            Settlement::Rejected(error) => f.debug_tuple("Rejected").field(error).finish(),
        }
    }
}

/// Success resolver: receives the resolved value.
pub type SuccessFn<T> = Arc<dyn Fn(&T) -> BoxFuture<'static, ExtendedResult> + Send + Sync>;

/// Resolver receiving any settlement.
pub type SettledFn<T, E, O> =
    Arc<dyn for<'a> Fn(Settlement<'a, T, E>) -> BoxFuture<'static, O> + Send + Sync>;

type FinallyFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Configured feedback: a fixed value or a resolver computing one.
#[derive(Clone)]
pub enum Feedback<F, O> {
    Static(O),
    Dynamic(F),
}

impl<F, O: fmt::Debug> fmt::Debug for Feedback<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Feedback::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

fn settled_sync<T, E, O, F, R>(resolver: F) -> SettledFn<T, E, O>
where
    F: for<'a> Fn(Settlement<'a, T, E>) -> R + Send + Sync + 'static,
    R: Into<O>,
    O: Send + 'static,
{
    Arc::new(move |settlement: Settlement<'_, T, E>| {
        future::ready::<O>(resolver(settlement).into()).boxed()
    })
}

fn settled_async<T, E, O, F, Fut, R>(resolver: F) -> SettledFn<T, E, O>
where
    F: for<'a> Fn(Settlement<'a, T, E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<O>,
    O: Send + 'static,
{
    Arc::new(move |settlement: Settlement<'_, T, E>| {
        let pending = resolver(settlement);
        async move { Into::<O>::into(pending.await) }.boxed()
    })
}

/// Promise toast configuration.
///
/// Without a config, [`Store::promise`] does nothing and returns `None`.
pub struct PromiseConfig<T, E> {
    loading: Option<Content>,
    success: Option<Feedback<SuccessFn<T>, ExtendedResult>>,
    error: Option<Feedback<SettledFn<T, E, ExtendedResult>, ExtendedResult>>,
    description: Option<Feedback<SettledFn<T, E, Content>, Content>>,
    finally: Option<FinallyFn>,
    options: ToastOptions,
}

impl<T, E> Default for PromiseConfig<T, E> {
    fn default() -> Self {
        Self {
            loading: None,
            success: None,
            error: None,
            description: None,
            finally: None,
            options: ToastOptions::default(),
        }
    }
}

impl<T, E> PromiseConfig<T, E>
where
    T: 'static,
    E: 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Title of the loading toast shown while the operation runs.
    #[must_use]
    pub fn loading(mut self, title: impl Into<Content>) -> Self {
        self.loading = Some(title.into());
        self
    }

    #[must_use]
    pub fn success(mut self, result: impl Into<ExtendedResult>) -> Self {
        self.success = Some(Feedback::Static(result.into()));
        self
    }

    #[must_use]
    pub fn success_with<F, R>(mut self, resolver: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: Into<ExtendedResult>,
    {
        let resolver: SuccessFn<T> =
            Arc::new(move |value: &T| future::ready::<ExtendedResult>(resolver(value).into()).boxed());
        self.success = Some(Feedback::Dynamic(resolver));
        self
    }

    #[must_use]
    pub fn success_async<F, Fut, R>(mut self, resolver: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<ExtendedResult>,
    {
        let resolver: SuccessFn<T> = Arc::new(move |value: &T| {
            let pending = resolver(value);
            async move { Into::<ExtendedResult>::into(pending.await) }.boxed()
        });
        self.success = Some(Feedback::Dynamic(resolver));
        self
    }

    #[must_use]
    pub fn error(mut self, result: impl Into<ExtendedResult>) -> Self {
        self.error = Some(Feedback::Static(result.into()));
        self
    }

    #[must_use]
    pub fn error_with<F, R>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Settlement<'a, T, E>) -> R + Send + Sync + 'static,
        R: Into<ExtendedResult>,
    {
        self.error = Some(Feedback::Dynamic(settled_sync(resolver)));
        self
    }

    #[must_use]
    pub fn error_async<F, Fut, R>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Settlement<'a, T, E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<ExtendedResult>,
    {
        self.error = Some(Feedback::Dynamic(settled_async(resolver)));
        self
    }

    /// Static description, also shown on the loading toast.
    #[must_use]
    pub fn description(mut self, description: impl Into<Content>) -> Self {
        self.description = Some(Feedback::Static(description.into()));
        self
    }

    /// Description resolved once the outcome is known.
    #[must_use]
    pub fn description_with<F, R>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Settlement<'a, T, E>) -> R + Send + Sync + 'static,
        R: Into<Content>,
    {
        self.description = Some(Feedback::Dynamic(settled_sync(resolver)));
        self
    }

    #[must_use]
    pub fn description_async<F, Fut, R>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Settlement<'a, T, E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<Content>,
    {
        self.description = Some(Feedback::Dynamic(settled_async(resolver)));
        self
    }

    /// Hook run after settlement, whatever the outcome.
    #[must_use]
    pub fn finally<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.finally = Some(Arc::new(move || {
            hook();
            future::ready(()).boxed()
        }));
        self
    }

    #[must_use]
    pub fn finally_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.finally = Some(Arc::new(move || hook().boxed()));
        self
    }

    /// Toast options spread into the loading toast.
    #[must_use]
    pub fn options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }
}

impl<T, E> fmt::Debug for PromiseConfig<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseConfig")
            .field("loading", &self.loading)
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("description", &self.description.is_some())
            .field("finally", &self.finally.is_some())
            .finish()
    }
}

// ==========================================================================
// Handle
// ==========================================================================

/// Failure observed through [`PromiseHandle::unwrap`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PromiseError<E> {
    /// The operation rejected.
    #[error("operation rejected: {0}")]
    Rejected(E),
    /// A success, error, description or finally hook panicked.
    #[error("promise handler panicked: {0}")]
    HandlerPanicked(String),
    /// The task settling the operation ended without an outcome.
    #[error("promise task ended before settling")]
    Abandoned,
}

type Outcome<T, E> = Option<Result<T, PromiseError<E>>>;

/// Handle to a bound operation.
pub struct PromiseHandle<T, E> {
    id: Option<ToastId>,
    outcome: watch::Receiver<Outcome<T, E>>,
}

impl<T, E> PromiseHandle<T, E> {
    /// Id of the loading toast, when one was created.
    #[must_use]
    pub fn id(&self) -> Option<&ToastId> {
        self.id.as_ref()
    }

    /// Returns true once the operation settled and all toast updates ran.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Waits for the original outcome of the operation.
    ///
    /// May be awaited any number of times; every call observes the same
    /// outcome, after the toast side effects completed.
    pub async fn unwrap(&self) -> Result<T, PromiseError<E>>
    where
        T: Clone,
        E: Clone,
    {
        let mut outcome = self.outcome.clone();
        let settled = match outcome.wait_for(Option::is_some).await {
            Ok(settled) => settled.clone().unwrap_or(Err(PromiseError::Abandoned)),
            Err(_) => Err(PromiseError::Abandoned),
        };
        settled
    }
}

impl<T, E> Clone for PromiseHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

impl<T, E> fmt::Debug for PromiseHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseHandle")
            .field("id", &self.id)
            .field("settled", &self.is_settled())
            .finish()
    }
}

// ==========================================================================
// Binding
// ==========================================================================

impl Store {
    /// Binds a toast to `operation`.
    ///
    /// Returns `None` without polling the operation when `config` is `None`.
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
        let config = config?;
        Some(self.bind(operation, config))
    }

    /// Like [`Store::promise`], calling `producer` exactly once to obtain
    /// the operation. The producer is not called without a config.
    pub fn promise_with<T, E, P, Fut>(
        &self,
        producer: P,
        config: Option<PromiseConfig<T, E>>,
    ) -> Option<PromiseHandle<T, E>>
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: PromiseValue + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        let config = config?;
        Some(self.bind(producer(), config))
    }

    fn bind<T, E, Fut>(&self, operation: Fut, config: PromiseConfig<T, E>) -> PromiseHandle<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: PromiseValue + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        let id = config.loading.clone().map(|loading| {
            let mut options = config
                .options
                .clone()
                .title(loading)
                .toast_type(ToastType::Loading);
            options.promise = Some(true);
            options.description = match &config.description {
                Some(Feedback::Static(description)) => Some(description.clone()),
                _ => None,
            };
            self.create(options)
        });

        let (sender, outcome) = watch::channel(None);
        let store = self.clone();
        let loading_id = id.clone();
        let task = async move {
            let result = operation.await;
            let settled = settle(&store, &config, loading_id, result).await;
            sender.send_replace(Some(settled));
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(task);
            }
            Err(_) => {
                tracing::warn!("no async runtime available, settling promise on a helper thread");
                std::thread::spawn(move || {
                    match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(runtime) => runtime.block_on(task),
                        Err(err) => tracing::error!(%err, "failed to start promise runtime"),
                    }
                });
            }
        }

        PromiseHandle { id, outcome }
    }
}

async fn settle<T, E>(
    store: &Store,
    config: &PromiseConfig<T, E>,
    id: Option<ToastId>,
    result: Result<T, E>,
) -> Result<T, PromiseError<E>>
where
    T: PromiseValue + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    let mut should_dismiss = id.is_some();
    let reaction = AssertUnwindSafe(react(store, config, &id, &result, &mut should_dismiss))
        .catch_unwind()
        .await;

    let panicked = reaction.err().map(panic_message);
    if let Some(message) = &panicked {
        tracing::error!(reason = %message, "promise toast handler panicked");
        should_dismiss = true;
    }

    if should_dismiss {
        if let Some(id) = &id {
            store.dismiss(id.clone());
        }
    }

    if let Some(hook) = &config.finally {
        let finished = AssertUnwindSafe(async { hook().await }).catch_unwind().await;
        if let Err(payload) = finished {
            tracing::error!(reason = %panic_message(payload), "promise finally hook panicked");
        }
    }

    match (panicked, result) {
        (Some(message), _) => Err(PromiseError::HandlerPanicked(message)),
        (None, Ok(value)) => Ok(value),
        (None, Err(error)) => Err(PromiseError::Rejected(error)),
    }
}

async fn react<T, E>(
    store: &Store,
    config: &PromiseConfig<T, E>,
    id: &Option<ToastId>,
    result: &Result<T, E>,
    should_dismiss: &mut bool,
) where
    T: PromiseValue + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    match result {
        Ok(value) => match classify(value) {
            Classification::ExtendedResult(extended) => {
                *should_dismiss = false;
                finish(store, config, id, ToastType::Default, None, Some(extended));
            }
            Classification::FailedResponse { status } => {
                *should_dismiss = false;
                let message = format!("HTTP error! status: {status}");
                let settlement = Settlement::HttpFailure(&message);
                let extended = resolve(&config.error, settlement).await;
                let description = resolve(&config.description, settlement).await;
                finish(store, config, id, ToastType::Error, description, extended);
            }
            Classification::ErrorValue => {
                *should_dismiss = false;
                let settlement = Settlement::Resolved(value);
                let extended = resolve(&config.error, settlement).await;
                let description = resolve(&config.description, settlement).await;
                finish(store, config, id, ToastType::Error, description, extended);
            }
            Classification::SuccessValue => {
                let Some(success) = &config.success else {
                    return;
                };
                *should_dismiss = false;
                let extended = match success {
                    Feedback::Static(extended) => extended.clone(),
                    Feedback::Dynamic(resolver) => resolver(value).await,
                };
                let description =
                    resolve(&config.description, Settlement::Resolved(value)).await;
                finish(store, config, id, ToastType::Success, description, Some(extended));
            }
        },
        Err(error) => {
            if config.error.is_none() {
                return;
            }
            *should_dismiss = false;
            let settlement = Settlement::Rejected(error);
            let extended = resolve(&config.error, settlement).await;
            let description = resolve(&config.description, settlement).await;
            finish(store, config, id, ToastType::Error, description, extended);
        }
    }
}

async fn resolve<T, E, O: Clone>(
    feedback: &Option<Feedback<SettledFn<T, E, O>, O>>,
    settlement: Settlement<'_, T, E>,
) -> Option<O> {
    match feedback {
        None => None,
        Some(Feedback::Static(value)) => Some(value.clone()),
        Some(Feedback::Dynamic(resolver)) => Some(resolver(settlement).await),
    }
}

/// Applies the terminal update: `{id, type, description}` overlaid with the
/// extended result.
fn finish<T, E>(
    store: &Store,
    config: &PromiseConfig<T, E>,
    id: &Option<ToastId>,
    toast_type: ToastType,
    description: Option<Content>,
    extended: Option<ExtendedResult>,
) {
    let mut options = match id {
        Some(id) => ToastOptions::new().id(id.clone()),
        None => config.options.clone(),
    }
    .toast_type(toast_type);
    options.description = description;

    if let Some(ExtendedResult {
        message,
        options: overrides,
    }) = extended
    {
        options = options.title(message).overlay(overrides);
    }
    store.create(options);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
