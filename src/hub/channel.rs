//! Compile-time channel contracts.
//!
//! The registries underneath both hubs are untyped (`serde_json::Value` in,
//! `serde_json::Value` out) so one shared instance can serve every caller.
//! These traits describe a channel's name and payload types once, and the
//! typed hub methods (`CallHub::handle`, `CallHub::call`,
//! `FanoutHub::subscribe`, `FanoutHub::publish`) use them to convert at the
//! edges.
//!
//! # Example
//! ```rust,ignore
//! struct Sum;
//!
//! impl CallChannel for Sum {
//!     const NAME: &'static str = "sum";
//!     type Request = SumArgs;
//!     type Response = i64;
//! }
//!
//! hub.handle_sync::<Sum, _>(|args| Ok(args.a + args.b))?;
//! let total = hub.call::<Sum>(SumArgs { a: 2, b: 3 }).await?;
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A renderer → main request/response channel.
pub trait CallChannel: 'static {
    const NAME: &'static str;
    type Request: Serialize + DeserializeOwned + Send + 'static;
    type Response: Serialize + DeserializeOwned + Send + 'static;
}

/// A main → renderer broadcast channel.
pub trait EventChannel: 'static {
    const NAME: &'static str;
    type Payload: Serialize + DeserializeOwned + Send + 'static;
}
