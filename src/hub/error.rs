use std::fmt;

use serde::{Serialize, Serializer};

/// Error type returned by application handlers and listeners.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Which side of the bridge a hub serves. Used to label error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Main,
    Renderer,
}

impl Side {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Renderer => "renderer",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a channel name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFault {
    NotString,
    Empty,
}

impl fmt::Display for NameFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotString => f.write_str("not string"),
            Self::Empty => f.write_str("empty"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("[{tag} {side}] param name is {fault}")]
    InvalidName {
        tag: String,
        side: Side,
        fault: NameFault,
    },
    #[error("[{tag} main] main process not listen {channel}")]
    NotListening { tag: String, channel: String },
    #[error("[{tag} {side}] handler for {channel} panicked: {message}")]
    HandlerPanicked {
        tag: String,
        side: Side,
        channel: String,
        message: String,
    },
    #[error("[{tag} {side}] invalid payload on {channel}: {source}")]
    Payload {
        tag: String,
        side: Side,
        channel: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid envelope: {0}")]
    Envelope(String),
    #[error(transparent)]
    Handler(HandlerError),
}

impl HubError {
    /// Converts a handler failure into a hub error without rewrapping errors
    /// that already originated in a hub (nested calls, typed payload decoding).
    pub(crate) fn from_handler(err: HandlerError) -> Self {
        match err.downcast::<HubError>() {
            Ok(hub_err) => *hub_err,
            Err(other) => Self::Handler(other),
        }
    }

    pub(crate) fn payload(tag: &str, side: Side, channel: &str, source: serde_json::Error) -> Self {
        Self::Payload {
            tag: tag.to_string(),
            side,
            channel: channel.to_string(),
            source,
        }
    }
}

impl Serialize for HubError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
