//! Shared fixtures for hub integration tests.

pub mod loopback_transport;

use std::sync::{Arc, Mutex};

use ipc_hub::{CallChannel, EventChannel, HandlerError, Listener};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use loopback_transport::LoopbackTransport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumArgs {
    pub a: i64,
    pub b: i64,
}

pub struct Sum;

impl CallChannel for Sum {
    const NAME: &'static str = "it.sum";
    type Request = SumArgs;
    type Response = i64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    pub text: String,
}

pub struct Status;

impl EventChannel for Status {
    const NAME: &'static str = "it.status";
    type Payload = StatusLine;
}

/// A buffer that listeners append to.
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<Value>>>);

impl Buffer {
    pub fn listener(&self) -> Listener {
        let inner = Arc::clone(&self.0);
        Listener::new(move |data| {
            inner.lock().unwrap().push(data.clone());
            Ok::<(), HandlerError>(())
        })
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.lock().unwrap().push(value.into());
    }

    pub fn contents(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }
}
