use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;

use super::channel::EventChannel;
use super::error::{HandlerError, HubError, Side};
use super::validate;
use crate::config::{HubConfig, DEFAULT_TAG};

type ListenerFn = dyn Fn(&Value) -> Result<(), HandlerError> + Send + Sync;

/// A renderer-side listener.
///
/// Equality is identity: two `Listener`s are equal only when they are clones
/// of the same registration, which is what [`FanoutHub::off`] matches on.
#[derive(Clone)]
pub struct Listener(Arc<ListenerFn>);

impl Listener {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn same(&self, other: &Listener) -> bool {
        Arc::as_ptr(&self.0).cast::<()>() == Arc::as_ptr(&other.0).cast::<()>()
    }

    fn invoke(&self, data: &Value) -> Result<(), HandlerError> {
        (self.0)(data)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// Publish/subscribe registry: an ordered listener list per channel.
///
/// Clones share the same registry.
#[derive(Clone)]
pub struct FanoutHub {
    listeners: Arc<DashMap<String, Vec<Listener>>>,
    tag: Arc<str>,
}

impl FanoutHub {
    pub fn new() -> Self {
        Self::with_tag(DEFAULT_TAG)
    }

    pub fn with_config(config: &HubConfig) -> Self {
        Self::with_tag(&config.tag)
    }

    fn with_tag(tag: &str) -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
            tag: Arc::from(tag),
        }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    /// Append `listener` to the list for `name`. Duplicates are kept.
    pub fn on(&self, name: &str, listener: Listener) -> Result<(), HubError> {
        let name = validate::channel_name(&self.tag, Side::Renderer, name)?;
        let mut entry = self.listeners.entry(name.to_string()).or_default();
        entry.push(listener);
        tracing::debug!(channel = name, count = entry.len(), "registered renderer listener");
        Ok(())
    }

    /// Wrap `f` in a [`Listener`], register it, and hand it back for a later `off`.
    pub fn on_fn<F>(&self, name: &str, f: F) -> Result<Listener, HubError>
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let listener = Listener::new(f);
        self.on(name, listener.clone())?;
        Ok(listener)
    }

    /// With `None`, drop every listener on `name`. With `Some`, drop only the
    /// first entry that is that same listener; other entries keep their
    /// order and count. Absent channels and listeners are ignored.
    pub fn off(&self, name: &str, listener: Option<&Listener>) -> Result<(), HubError> {
        let name = validate::channel_name(&self.tag, Side::Renderer, name)?;

        let Some(listener) = listener else {
            if self.listeners.remove(name).is_some() {
                tracing::debug!(channel = name, "removed all renderer listeners");
            }
            return Ok(());
        };

        let emptied = match self.listeners.get_mut(name) {
            Some(mut entry) => match entry.iter().position(|l| l.same(listener)) {
                Some(index) => {
                    entry.remove(index);
                    tracing::debug!(channel = name, index, "removed renderer listener");
                    entry.is_empty()
                }
                None => false,
            },
            None => false,
        };
        if emptied {
            self.listeners.remove_if(name, |_, list| list.is_empty());
        }
        Ok(())
    }

    /// Invoke every listener on `name` in registration order.
    ///
    /// A channel with no listeners is a no-op. The first listener error is
    /// returned and the listeners after it are skipped. Listeners run over a
    /// snapshot of the list, so `on`/`off` calls made from inside a listener
    /// apply from the next `emit`.
    pub fn emit(&self, name: &str, data: &Value) -> Result<(), HubError> {
        let name = validate::channel_name(&self.tag, Side::Renderer, name)?;

        let snapshot = match self.listeners.get(name) {
            Some(entry) => entry.value().clone(),
            None => {
                tracing::trace!(channel = name, "broadcast with no listeners");
                return Ok(());
            }
        };

        tracing::trace!(channel = name, count = snapshot.len(), "broadcasting");
        for (index, listener) in snapshot.iter().enumerate() {
            if let Err(err) = listener.invoke(data) {
                tracing::warn!(channel = name, index, "renderer listener failed: {err}");
                return Err(HubError::from_handler(err));
            }
        }
        Ok(())
    }

    /// Register a listener for a typed channel.
    pub fn subscribe<C, F>(&self, f: F) -> Result<Listener, HubError>
    where
        C: EventChannel,
        F: Fn(C::Payload) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let tag = Arc::clone(&self.tag);
        self.on_fn(C::NAME, move |data| {
            let payload = <C::Payload as Deserialize>::deserialize(data)
                .map_err(|e| HubError::payload(&tag, Side::Renderer, C::NAME, e))?;
            f(payload)
        })
    }

    /// Typed counterpart of [`FanoutHub::emit`].
    pub fn publish<C: EventChannel>(&self, payload: &C::Payload) -> Result<(), HubError> {
        let data = serde_json::to_value(payload)
            .map_err(|e| HubError::payload(&self.tag, Side::Renderer, C::NAME, e))?;
        self.emit(C::NAME, &data)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, |entry| entry.len())
    }

    /// Channel names with at least one listener, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for FanoutHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FanoutHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutHub")
            .field("tag", &self.tag)
            .field("channels", &self.channels())
            .finish()
    }
}
