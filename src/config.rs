use serde::{Deserialize, Serialize};

/// Prefix used in hub error messages, e.g. `[ipc-hub main] ...`.
pub const DEFAULT_TAG: &str = "ipc-hub";
pub const DEFAULT_LOG_FILTER: &str = "ipc_hub=debug,info";

pub const ENV_LOG: &str = "IPC_HUB_LOG";
pub const ENV_LOG_JSON: &str = "IPC_HUB_LOG_JSON";
pub const ENV_TAG: &str = "IPC_HUB_TAG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_json: false,
            tag: default_tag(),
        }
    }
}

impl HubConfig {
    /// Build a config from the process environment, loading `.env` first if
    /// one exists. Blank variables fall back to defaults.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(filter) = non_blank(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(flag) = non_blank(ENV_LOG_JSON) {
            config.log_json = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(tag) = non_blank(ENV_TAG) {
            config.tag = tag;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = HubConfig::from_lookup(|_| None);
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.tag, "ipc-hub");
    }

    #[test]
    fn test_env_overrides() {
        let config = HubConfig::from_lookup(lookup_from(&[
            (ENV_LOG, "ipc_hub=trace"),
            (ENV_LOG_JSON, "TRUE"),
            (ENV_TAG, "shell"),
        ]));
        assert_eq!(config.log_filter, "ipc_hub=trace");
        assert!(config.log_json);
        assert_eq!(config.tag, "shell");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = HubConfig::from_lookup(lookup_from(&[(ENV_LOG, "   "), (ENV_TAG, "")]));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.tag, DEFAULT_TAG);
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let config: HubConfig = serde_json::from_str(r#"{"log_json": true}"#).unwrap();
        assert!(config.log_json);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.tag, DEFAULT_TAG);
    }
}
