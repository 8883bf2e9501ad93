//! Channel-name checks shared by both hubs and the bridge endpoints.

use serde_json::Value;

use super::error::{HubError, NameFault, Side};

/// Rejects empty channel names.
pub(crate) fn channel_name<'a>(tag: &str, side: Side, name: &'a str) -> Result<&'a str, HubError> {
    if name.is_empty() {
        return Err(invalid(tag, side, NameFault::Empty));
    }
    Ok(name)
}

/// Runtime check for names arriving in deserialized envelopes, where the
/// value may not be a string at all.
pub(crate) fn channel_name_value<'a>(
    tag: &str,
    side: Side,
    value: &'a Value,
) -> Result<&'a str, HubError> {
    let Value::String(name) = value else {
        return Err(invalid(tag, side, NameFault::NotString));
    };
    channel_name(tag, side, name)
}

fn invalid(tag: &str, side: Side, fault: NameFault) -> HubError {
    HubError::InvalidName {
        tag: tag.to_string(),
        side,
        fault,
    }
}
