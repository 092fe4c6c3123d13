//! Parameter signatures and resolution against the parameter space.

use super::{ParamValue, ParameterSpace};
use crate::errors::MissingParametersError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The parameters a step or validator declares.
///
/// A name is either required (no default) or carries a default, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSignature {
    /// Names without a default, in declaration order.
    #[serde(default)]
    pub required: Vec<String>,
    /// Names with a default value.
    #[serde(default)]
    pub defaults: BTreeMap<String, ParamValue>,
}

impl ParamSignature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required parameter.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.defaults.remove(&name);
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Adds several required parameters.
    #[must_use]
    pub fn require_all(self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        names.into_iter().fold(self, Self::require)
    }

    /// Adds a parameter with a default value.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let name = name.into();
        self.required.retain(|r| r != &name);
        self.defaults.insert(name, value.into());
        self
    }

    /// Returns true if the callable declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.defaults.is_empty()
    }

    /// Resolves this signature against a parameter space.
    ///
    /// # Errors
    ///
    /// Returns `MissingParametersError` naming every required key absent from
    /// `space`.
    pub fn resolve(&self, space: &ParameterSpace) -> Result<Params, MissingParametersError> {
        resolve(&self.required, &self.defaults, space)
    }
}

/// Resolved arguments handed to a callable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Gets an argument or fails with a descriptive error.
    ///
    /// Intended for use inside callables, which return `anyhow::Result`.
    pub fn value(&self, key: &str) -> anyhow::Result<&ParamValue> {
        self.values
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("parameter '{key}' was not resolved"))
    }

    /// Gets an integer argument.
    pub fn int(&self, key: &str) -> anyhow::Result<i64> {
        let value = self.value(key)?;
        value
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("parameter '{key}' is {}, expected int", value.type_name()))
    }

    /// Gets a float argument.
    pub fn float(&self, key: &str) -> anyhow::Result<f64> {
        let value = self.value(key)?;
        value
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("parameter '{key}' is {}, expected float", value.type_name()))
    }

    /// Gets a boolean argument.
    pub fn bool(&self, key: &str) -> anyhow::Result<bool> {
        let value = self.value(key)?;
        value
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("parameter '{key}' is {}, expected bool", value.type_name()))
    }

    /// Gets a string argument.
    pub fn str(&self, key: &str) -> anyhow::Result<&str> {
        let value = self.value(key)?;
        value
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("parameter '{key}' is {}, expected str", value.type_name()))
    }

    /// Iterates over arguments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the argument set into its map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, ParamValue> {
        self.values
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Resolves declared parameters against the shared space.
///
/// Values present in `space` override declared defaults; required values are
/// pulled from `space`. `space` is never mutated.
///
/// # Errors
///
/// Returns `MissingParametersError` listing, in declaration order, every
/// required name absent from `space`.
pub fn resolve(
    required: &[String],
    defaults: &BTreeMap<String, ParamValue>,
    space: &ParameterSpace,
) -> Result<Params, MissingParametersError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !space.contains_key(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(MissingParametersError::new(missing));
    }

    let mut values: BTreeMap<String, ParamValue> = defaults
        .iter()
        .map(|(k, default)| (k.clone(), space.get(k).unwrap_or(default).clone()))
        .collect();

    for name in required {
        if let Some(value) = space.get(name) {
            values.insert(name.clone(), value.clone());
        }
    }

    Ok(Params { values })
}
