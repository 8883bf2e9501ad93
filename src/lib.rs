//! Typed in-process message hubs for a main/renderer split.
//!
//! A privileged main context and sandboxed renderer contexts talk through two
//! hubs without either side knowing how messages cross the boundary:
//! - `hub::CallHub`: renderer → main calls, one handler per channel
//! - `hub::FanoutHub`: main → renderer broadcasts, many listeners per channel
//!
//! # Architecture
//!
//! - `hub`: the registries, typed channel contracts and process-wide accessors
//! - `envelope`: the message shapes a transport carries
//! - `bridge`: endpoints a transport calls with decoded envelopes
//! - `config` / `telemetry`: environment-driven settings and tracing setup
//!
//! The transport itself (IPC channel, socket, webview bridge) is supplied by
//! the embedding application.

pub mod bridge;
pub mod config;
pub mod envelope;
pub mod hub;
pub mod telemetry;

pub use bridge::{MainEndpoint, RendererEndpoint};
pub use config::HubConfig;
pub use envelope::{MainReply, MainToRenderer, RendererToMain, ReplyOutcome};
pub use hub::{
    use_main_hub, use_renderer_hub, CallChannel, CallHub, EventChannel, FanoutHub, HandlerError,
    Handler, HubError, Listener,
};
pub use telemetry::init_tracing;
