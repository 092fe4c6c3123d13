//! The shared parameter namespace.

use super::ParamValue;
use std::collections::BTreeMap;

/// Key under which the executor stores the latest step return value.
pub const RET_KEY: &str = "ret";

/// Key under which the executor stores the latest validator return value.
pub const RET_VALID_KEY: &str = "ret_valid";

/// The single mutable namespace shared by every step and validator in a run.
///
/// Unlike a write-once bag, every write overwrites: later merges and return
/// values always win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSpace {
    data: BTreeMap<String, ParamValue>,
}

impl ParameterSpace {
    /// Creates a new empty parameter space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter space from existing data.
    #[must_use]
    pub fn from_data(data: impl IntoIterator<Item = (String, ParamValue)>) -> Self {
        Self {
            data: data.into_iter().collect(),
        }
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.data.get(key)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Sets a value, overwriting any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.data.insert(key.into(), value.into());
    }

    /// Merges a mapping: new keys are added, existing keys overwritten.
    pub fn merge<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.data
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Returns the latest step return value.
    #[must_use]
    pub fn ret(&self) -> Option<&ParamValue> {
        self.get(RET_KEY)
    }

    /// Returns the latest validator return value.
    #[must_use]
    pub fn ret_valid(&self) -> Option<&ParamValue> {
        self.get(RET_VALID_KEY)
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, ParamValue> {
        self.data.clone()
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.data.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the space is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}
