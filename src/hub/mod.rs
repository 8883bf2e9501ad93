//! Message hubs bridging the main context and renderer contexts.
//!
//! - [`CallHub`]: main side, one handler per channel, `emit` awaits a result
//! - [`FanoutHub`]: renderer side, ordered listeners per channel, `emit`
//!   broadcasts and discards results
//!
//! Hubs are plain values. A composition root can build its own with
//! `CallHub::new()` / `FanoutHub::new()` and pass clones around (clones share
//! one registry). Code that needs the process-wide instance uses
//! [`use_main_hub`] and [`use_renderer_hub`], which create it on first use.

mod call_hub;
mod channel;
mod error;
mod fanout_hub;
mod validate;

use std::sync::OnceLock;

pub use call_hub::{CallHub, Handler};
pub use channel::{CallChannel, EventChannel};
pub use error::{HandlerError, HubError, NameFault, Side};
pub use fanout_hub::{FanoutHub, Listener};

pub(crate) use validate::channel_name_value;

static MAIN_HUB: OnceLock<CallHub> = OnceLock::new();
static RENDERER_HUB: OnceLock<FanoutHub> = OnceLock::new();

/// Get or initialize the process-wide main hub.
pub fn use_main_hub() -> &'static CallHub {
    MAIN_HUB.get_or_init(CallHub::new)
}

/// Get or initialize the process-wide renderer hub.
pub fn use_renderer_hub() -> &'static FanoutHub {
    RENDERER_HUB.get_or_init(FanoutHub::new)
}
