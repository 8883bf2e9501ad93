//! In-memory stand-in for the process boundary.
//!
//! Envelopes travel as JSON strings over unbounded channels, like they would
//! over a real pipe, and replies are routed back to the caller by id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ipc_hub::{MainEndpoint, MainReply, RendererToMain};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<MainReply>>>>;

pub struct LoopbackTransport {
    outbound: mpsc::UnboundedSender<String>,
    pending: Pending,
}

impl LoopbackTransport {
    /// Start the main-side pump and the reply router for `endpoint`.
    pub fn connect(endpoint: MainEndpoint) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<String>();
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(line) = request_rx.recv().await {
                let endpoint = endpoint.clone();
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let raw: Value = serde_json::from_str(&line).expect("request is json");
                    if let Ok(reply) = endpoint.handle_value(raw).await {
                        let line = serde_json::to_string(&reply).expect("reply serializes");
                        let _ = reply_tx.send(line);
                    }
                });
            }
        });

        let pending: Pending = Arc::default();
        let router = Arc::clone(&pending);
        tokio::spawn(async move {
            while let Some(line) = reply_rx.recv().await {
                let reply: MainReply = serde_json::from_str(&line).expect("reply is json");
                let waiter = router.lock().unwrap().remove(&reply.id);
                if let Some(waiter) = waiter {
                    let _ = waiter.send(reply);
                }
            }
        });

        Self {
            outbound: request_tx,
            pending,
        }
    }

    pub async fn call(&self, name: &str, data: Value) -> MainReply {
        let envelope = RendererToMain::new(name, data);
        self.send_raw(serde_json::to_value(envelope).expect("envelope serializes"))
            .await
    }

    /// Send an arbitrary JSON envelope. It must carry a string `id`.
    pub async fn send_raw(&self, raw: Value) -> MainReply {
        let id = raw["id"].as_str().expect("envelope has an id").to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);
        self.outbound.send(raw.to_string()).expect("main side is running");
        rx.await.expect("reply routed back")
    }
}
