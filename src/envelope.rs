//! Message shapes exchanged with the transport layer.
//!
//! The hubs only see `(name, data)` pairs; these types are what a transport
//! carries across the process boundary around them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Renderer → main call. `id` correlates the eventual [`MainReply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererToMain {
    pub id: String,
    pub data: Value,
    pub name: String,
}

impl RendererToMain {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data,
            name: name.into(),
        }
    }
}

/// Main → renderer broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainToRenderer {
    pub data: Value,
    pub name: String,
}

impl MainToRenderer {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            data,
            name: name.into(),
        }
    }
}

/// Answer to a [`RendererToMain`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReply {
    pub id: String,
    #[serde(flatten)]
    pub outcome: ReplyOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    Ok(Value),
    Error(String),
}

impl MainReply {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Ok(_))
    }
}
