use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use serde_json::Value;

use super::channel::CallChannel;
use super::error::{HandlerError, HubError, Side};
use super::validate;
use crate::config::{HubConfig, DEFAULT_TAG};

/// A main-side handler that answers one call.
///
/// Closures can be registered directly through [`CallHub::on_fn`] and
/// [`CallHub::on_sync`]; implement this trait for handlers that carry state.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, data: Value) -> Result<Value, HandlerError>;
}

struct AsyncFnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for AsyncFnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn call(&self, data: Value) -> Result<Value, HandlerError> {
        (self.0)(data).await
    }
}

struct SyncFnHandler<F>(F);

#[async_trait]
impl<F> Handler for SyncFnHandler<F>
where
    F: Fn(Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
{
    async fn call(&self, data: Value) -> Result<Value, HandlerError> {
        (self.0)(data)
    }
}

/// Call/response registry: at most one handler per channel.
///
/// Clones share the same registry.
#[derive(Clone)]
pub struct CallHub {
    handlers: Arc<DashMap<String, Arc<dyn Handler>>>,
    tag: Arc<str>,
}

impl CallHub {
    pub fn new() -> Self {
        Self::with_tag(DEFAULT_TAG)
    }

    pub fn with_config(config: &HubConfig) -> Self {
        Self::with_tag(&config.tag)
    }

    fn with_tag(tag: &str) -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            tag: Arc::from(tag),
        }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    /// Bind `handler` to `name`, silently replacing any previous handler.
    pub fn on<H: Handler + 'static>(&self, name: &str, handler: H) -> Result<(), HubError> {
        let name = validate::channel_name(&self.tag, Side::Main, name)?;
        if self
            .handlers
            .insert(name.to_string(), Arc::new(handler))
            .is_some()
        {
            tracing::debug!(channel = name, "replaced main handler");
        } else {
            tracing::debug!(channel = name, "registered main handler");
        }
        Ok(())
    }

    /// Bind an async closure to `name`.
    pub fn on_fn<F, Fut>(&self, name: &str, handler: F) -> Result<(), HubError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.on(name, AsyncFnHandler(handler))
    }

    /// Bind a synchronous closure to `name`.
    pub fn on_sync<F>(&self, name: &str, handler: F) -> Result<(), HubError>
    where
        F: Fn(Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.on(name, SyncFnHandler(handler))
    }

    /// Remove the handler bound to `name`, if any.
    pub fn off(&self, name: &str) -> Result<(), HubError> {
        let name = validate::channel_name(&self.tag, Side::Main, name)?;
        if self.handlers.remove(name).is_some() {
            tracing::debug!(channel = name, "removed main handler");
        }
        Ok(())
    }

    /// Invoke the handler bound to `name` and await its result.
    ///
    /// Every handler failure becomes an `Err`: a returned error is passed
    /// through as-is, a panic becomes [`HubError::HandlerPanicked`]. Calls on
    /// an unbound channel fail with [`HubError::NotListening`].
    pub async fn emit(&self, name: &str, data: Value) -> Result<Value, HubError> {
        let name = validate::channel_name(&self.tag, Side::Main, name)?;

        // Clone the handler out so the map shard is unlocked while it runs.
        let handler = self
            .handlers
            .get(name)
            .map(|entry| Arc::clone(entry.value()));
        let Some(handler) = handler else {
            tracing::warn!(channel = name, "call on channel with no main handler");
            return Err(HubError::NotListening {
                tag: self.tag.to_string(),
                channel: name.to_string(),
            });
        };

        tracing::trace!(channel = name, "dispatching call");
        match AssertUnwindSafe(handler.call(data)).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::warn!(channel = name, "main handler failed: {err}");
                Err(HubError::from_handler(err))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(channel = name, "main handler panicked: {message}");
                Err(HubError::HandlerPanicked {
                    tag: self.tag.to_string(),
                    side: Side::Main,
                    channel: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Register an async handler for a typed channel.
    pub fn handle<C, F, Fut>(&self, handler: F) -> Result<(), HubError>
    where
        C: CallChannel,
        F: Fn(C::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C::Response, HandlerError>> + Send + 'static,
    {
        let tag = Arc::clone(&self.tag);
        let handler = Arc::new(handler);
        self.on_fn(C::NAME, move |data| {
            let tag = Arc::clone(&tag);
            let handler = Arc::clone(&handler);
            async move {
                let request = decode::<C>(&tag, data)?;
                let response = (*handler)(request).await?;
                Ok::<Value, HandlerError>(encode::<C>(&tag, response)?)
            }
        })
    }

    /// Register a synchronous handler for a typed channel.
    pub fn handle_sync<C, F>(&self, handler: F) -> Result<(), HubError>
    where
        C: CallChannel,
        F: Fn(C::Request) -> Result<C::Response, HandlerError> + Send + Sync + 'static,
    {
        let tag = Arc::clone(&self.tag);
        self.on_sync(C::NAME, move |data| {
            let request = decode::<C>(&tag, data)?;
            let response = handler(request)?;
            Ok(encode::<C>(&tag, response)?)
        })
    }

    /// Typed counterpart of [`CallHub::emit`].
    pub async fn call<C: CallChannel>(&self, request: C::Request) -> Result<C::Response, HubError> {
        let data = serde_json::to_value(request)
            .map_err(|e| HubError::payload(&self.tag, Side::Main, C::NAME, e))?;
        let value = self.emit(C::NAME, data).await?;
        serde_json::from_value(value).map_err(|e| HubError::payload(&self.tag, Side::Main, C::NAME, e))
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Bound channel names, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CallHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallHub")
            .field("tag", &self.tag)
            .field("channels", &self.channels())
            .finish()
    }
}

fn decode<C: CallChannel>(tag: &str, data: Value) -> Result<C::Request, HubError> {
    serde_json::from_value(data).map_err(|e| HubError::payload(tag, Side::Main, C::NAME, e))
}

fn encode<C: CallChannel>(tag: &str, response: C::Response) -> Result<Value, HubError> {
    serde_json::to_value(response).map_err(|e| HubError::payload(tag, Side::Main, C::NAME, e))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
