//! Endpoints a transport layer calls when a message crosses the boundary.
//!
//! This is the only place channel names are checked at runtime for type: the
//! raw envelope came from outside the process and its `name` may be anything.
//! Everything past this point is typed.

use serde_json::{Map, Value};

use crate::envelope::{MainReply, MainToRenderer, RendererToMain, ReplyOutcome};
use crate::hub::{channel_name_value, CallHub, FanoutHub, HubError, Side};

/// Feeds renderer → main envelopes into a [`CallHub`].
#[derive(Debug, Clone)]
pub struct MainEndpoint {
    hub: CallHub,
}

impl MainEndpoint {
    pub fn new(hub: CallHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &CallHub {
        &self.hub
    }

    /// Dispatch a call and wrap the outcome in a reply carrying the same id.
    pub async fn handle(&self, envelope: RendererToMain) -> MainReply {
        let RendererToMain { id, data, name } = envelope;
        let outcome = match self.hub.emit(&name, data).await {
            Ok(value) => ReplyOutcome::Ok(value),
            Err(e) => ReplyOutcome::Error(e.to_string()),
        };
        MainReply { id, outcome }
    }

    /// Validate and dispatch a raw envelope.
    ///
    /// Fails only when there is no string `id` to reply to. Once the id is
    /// known, every other problem (bad name included) is reported through the
    /// reply.
    pub async fn handle_value(&self, raw: Value) -> Result<MainReply, HubError> {
        let mut fields = into_object(raw)?;
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(HubError::Envelope("missing string id".to_string())),
        };

        let name_value = fields.remove("name").unwrap_or(Value::Null);
        let name = match channel_name_value(self.hub.tag(), Side::Main, &name_value) {
            Ok(name) => name.to_string(),
            Err(e) => {
                tracing::warn!(id = %id, "rejected renderer envelope: {e}");
                return Ok(MainReply {
                    id,
                    outcome: ReplyOutcome::Error(e.to_string()),
                });
            }
        };
        let data = fields.remove("data").unwrap_or(Value::Null);

        Ok(self.handle(RendererToMain { id, data, name }).await)
    }
}

/// Feeds main → renderer envelopes into a [`FanoutHub`].
#[derive(Debug, Clone)]
pub struct RendererEndpoint {
    hub: FanoutHub,
}

impl RendererEndpoint {
    pub fn new(hub: FanoutHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &FanoutHub {
        &self.hub
    }

    pub fn deliver(&self, envelope: &MainToRenderer) -> Result<(), HubError> {
        self.hub.emit(&envelope.name, &envelope.data)
    }

    pub fn deliver_value(&self, raw: Value) -> Result<(), HubError> {
        let mut fields = into_object(raw)?;
        let name_value = fields.remove("name").unwrap_or(Value::Null);
        let name = channel_name_value(self.hub.tag(), Side::Renderer, &name_value)?;
        let data = fields.remove("data").unwrap_or(Value::Null);
        self.hub.emit(name, &data)
    }
}

fn into_object(raw: Value) -> Result<Map<String, Value>, HubError> {
    match raw {
        Value::Object(fields) => Ok(fields),
        other => Err(HubError::Envelope(format!(
            "expected object, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sum_endpoint() -> MainEndpoint {
        let hub = CallHub::new();
        hub.on_sync("sum", |data| {
            Ok(json!(data["a"].as_i64().unwrap_or(0) + data["b"].as_i64().unwrap_or(0)))
        })
        .unwrap();
        MainEndpoint::new(hub)
    }

    #[tokio::test]
    async fn test_handle_correlates_reply() {
        let endpoint = sum_endpoint();
        let call = RendererToMain::new("sum", json!({"a": 2, "b": 3}));
        let id = call.id.clone();

        let reply = endpoint.handle(call).await;
        assert_eq!(reply, MainReply { id, outcome: ReplyOutcome::Ok(json!(5)) });
    }

    #[tokio::test]
    async fn test_unregistered_channel_reply_names_it() {
        let endpoint = sum_endpoint();
        let reply = endpoint
            .handle(RendererToMain::new("product", json!(null)))
            .await;
        assert_eq!(
            reply.outcome,
            ReplyOutcome::Error("[ipc-hub main] main process not listen product".into())
        );
    }

    #[tokio::test]
    async fn test_handle_value_rejects_non_string_name_in_reply() {
        let endpoint = sum_endpoint();
        let reply = endpoint
            .handle_value(json!({"id": "r1", "name": 7, "data": {}}))
            .await
            .unwrap();
        assert_eq!(reply.id, "r1");
        assert_eq!(
            reply.outcome,
            ReplyOutcome::Error("[ipc-hub main] param name is not string".into())
        );
    }

    #[tokio::test]
    async fn test_handle_value_requires_id() {
        let endpoint = sum_endpoint();
        let err = endpoint
            .handle_value(json!({"name": "sum", "data": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Envelope(_)));

        let err = endpoint.handle_value(json!([1, 2])).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid envelope: expected object, got array");
    }

    #[tokio::test]
    async fn test_handle_value_dispatches() {
        let endpoint = sum_endpoint();
        let reply = endpoint
            .handle_value(json!({"id": "r2", "name": "sum", "data": {"a": 1, "b": 1}}))
            .await
            .unwrap();
        assert!(reply.is_ok());
        assert_eq!(reply.outcome, ReplyOutcome::Ok(json!(2)));
    }

    #[test]
    fn test_deliver_value_checks_name_type() {
        let hub = FanoutHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hub.on_fn("log", move |data| {
            sink.lock().unwrap().push(data.clone());
            Ok(())
        })
        .unwrap();
        let endpoint = RendererEndpoint::new(hub);

        endpoint.deliver_value(json!({"name": "log", "data": "x"})).unwrap();
        endpoint.deliver(&MainToRenderer::new("log", json!("y"))).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!("x"), json!("y")]);

        let err = endpoint
            .deliver_value(json!({"name": null, "data": "z"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "[ipc-hub renderer] param name is not string");
    }

    #[test]
    fn test_deliver_to_unknown_channel_is_silent() {
        let endpoint = RendererEndpoint::new(FanoutHub::new());
        assert!(endpoint
            .deliver_value(json!({"name": "nobody", "data": 1}))
            .is_ok());
    }
}
