use std::collections::HashMap;

use anyhow::anyhow;
use serde_json::Value;
use tracing::warn;

pub mod keys {
    /// disables the session's version resolution cache
    pub const VERSION_RESOLVER_NO_CACHE: &str = "resolver.versionResolver.noCache";
    /// a descriptor that can not be found yields an empty result instead of an error
    pub const DESCRIPTOR_IGNORE_MISSING: &str = "resolver.descriptor.ignoreMissing";
    /// a descriptor that can not be built yields an empty result instead of an error
    pub const DESCRIPTOR_IGNORE_INVALID: &str = "resolver.descriptor.ignoreInvalid";
    /// name of the registered version range strategy
    pub const VERSION_RANGE_STRATEGY: &str = "resolver.versionRange.strategy";
}

/// Read-only settings of a resolution session
pub trait Configuration: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Unparseable values are treated as absent
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    warn!("configuration value {:?} for {} is not a boolean, using {}", other, key, default);
                    default
                }
            }
        }
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .unwrap_or_else(|| default.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapConfiguration {
    values: HashMap<String, String>,
}
impl MapConfiguration {
    pub fn new() -> MapConfiguration {
        Default::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> MapConfiguration {
        MapConfiguration {
            values: pairs.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// a flat JSON object; values may be strings, booleans or numbers
    pub fn from_json(json: &str) -> anyhow::Result<MapConfiguration> {
        let parsed: HashMap<String, Value> = serde_json::from_str(json)?;

        let mut values = HashMap::new();
        for (key, value) in parsed {
            let value = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => return Err(anyhow!("unsupported configuration value for {}: {}", key, other)),
            };
            values.insert(key, value);
        }
        Ok(MapConfiguration { values })
    }

    pub fn with(mut self, key: &str, value: &str) -> MapConfiguration {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Configuration for MapConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
