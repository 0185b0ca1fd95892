//! Dropping storage providers the operator did not enable.
//!
//! The filter runs exactly once, right after the schema walk. A second pass
//! over its own output removes every provider, because the `enabled` flags it
//! relies on are gone by then.

use serde_json::{Map, Value};

use crate::schema::{ENABLED, STORAGE_PROVIDERS};

/// Keep only providers whose `enabled` flag is `true`, without the flag.
///
/// Sibling keys pass through untouched. A tree without a `storage_providers`
/// object is returned as is. Entries that are not objects, or whose flag is
/// missing or not a boolean, count as disabled.
pub fn filter_enabled_providers(mut config: Value) -> Value {
    let Some(Value::Object(providers)) = config.get_mut(STORAGE_PROVIDERS) else {
        return config;
    };

    let kept: Map<String, Value> = std::mem::take(providers)
        .into_iter()
        .filter_map(|(name, entry)| {
            let Value::Object(fields) = entry else {
                warn!("provider `{name}` is not a section, dropping it");
                return None;
            };
            if fields.get(ENABLED) != Some(&Value::Bool(true)) {
                debug!("provider `{name}` disabled");
                return None;
            }
            let fields: Map<String, Value> =
                fields.into_iter().filter(|(k, _)| k != ENABLED).collect();
            Some((name, Value::Object(fields)))
        })
        .collect();

    *providers = kept;
    config
}
