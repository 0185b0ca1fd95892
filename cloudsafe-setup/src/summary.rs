//! End-of-run configuration summary.

use serde_json::Value;

use crate::schema::{DEFAULT_SETTINGS, STORAGE_PROVIDERS};

/// Providers present in the written config and the chosen default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub providers: Vec<String>,
    pub default_provider: Option<String>,
}

impl Summary {
    /// Summarize the tree that was written to disk.
    pub fn from_config(config: &Value) -> Self {
        let providers = config
            .get(STORAGE_PROVIDERS)
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let default_provider = config
            .get(DEFAULT_SETTINGS)
            .and_then(|d| d.get("storage_provider"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            providers,
            default_provider,
        }
    }

    /// The default provider, if it is set but missing from the written providers.
    pub fn orphaned_default(&self) -> Option<&str> {
        self.default_provider
            .as_deref()
            .filter(|p| !self.providers.iter().any(|e| e == p))
    }
}
