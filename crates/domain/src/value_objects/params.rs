//! Caller-supplied generation parameters
//!
//! An open, string-keyed JSON map. Keys are kept in insertion order so two
//! identical calls always serialize identically.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Free-form caller overrides (prompt, numeric parameters, per-unit extension
/// fields, image references as opaque strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserParams(Map<String, Value>);

impl UserParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON value; anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Set a parameter (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A non-blank string parameter.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(lenient::as_f64)
    }

    /// A boolean parameter; "true"/"false" strings count.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(lenient::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for UserParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
