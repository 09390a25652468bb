//! Configuration value tree
//!
//! `ConfigValue` is the single value shape used everywhere in the engine:
//! every scope tree, every profile settings tree, and every persisted file is
//! a `ConfigValue` with an object at the root. The enum serializes untagged,
//! so persisted documents are plain JSON (or YAML) with no wrapper.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Object type used for map nodes (sorted keys keep persisted files stable)
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A configuration value: null, boolean, number, string, list, or map.
///
/// Consumers pattern-match exhaustively instead of duck-typing. Numbers are
/// stored as `f64`, matching the JSON data model.
///
/// # Example
///
/// ```
/// use layerconf::ConfigValue;
///
/// let mut tree = ConfigValue::object();
/// tree.set_path("ui.theme", "dark".into());
/// assert_eq!(tree.get_path("ui.theme").and_then(|v| v.as_str()), Some("dark"));
/// assert!(tree.get_path("ui.missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Absent / explicit null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Number (f64, JSON data model)
    Number(f64),
    /// String
    String(String),
    /// Ordered list of values
    Array(Vec<ConfigValue>),
    /// String-keyed map of values
    Object(ConfigMap),
}

impl ConfigValue {
    /// Create an empty object tree
    #[must_use]
    pub fn object() -> Self {
        ConfigValue::Object(ConfigMap::new())
    }

    /// True if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// True if this value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, ConfigValue::Object(_))
    }

    /// View as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// View as number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// View as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// View as array slice
    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// View as object map
    pub fn as_object(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable view as object map
    pub fn as_object_mut(&mut self) -> Option<&mut ConfigMap> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    // =========================================================================
    // Dot-path addressing
    // =========================================================================

    /// Look up a nested value by dot-separated key path.
    ///
    /// Absence at any intermediate segment means "not set", never an error.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a nested value by dot-separated key path.
    ///
    /// Intermediate map segments are created as needed; a non-object value
    /// sitting on an intermediate segment is replaced by a map.
    pub fn set_path(&mut self, path: &str, value: ConfigValue) {
        if !self.is_object() {
            *self = ConfigValue::object();
        }
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let map = current
                .as_object_mut()
                .expect("intermediate segment is always an object");
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value);
                return;
            }
            let entry = map
                .entry(segment.to_string())
                .or_insert_with(ConfigValue::object);
            if !entry.is_object() {
                *entry = ConfigValue::object();
            }
            current = entry;
        }
    }

    /// Remove a nested value by dot-separated key path, returning it if present
    pub fn remove_path(&mut self, path: &str) -> Option<ConfigValue> {
        match path.rsplit_once('.') {
            Some((parent, leaf)) => {
                let mut current = self;
                for segment in parent.split('.') {
                    current = current.as_object_mut()?.get_mut(segment)?;
                }
                current.as_object_mut()?.remove(leaf)
            }
            None => self.as_object_mut()?.remove(path),
        }
    }

    /// Check if a non-null value exists at the given path
    pub fn contains_path(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(|v| !v.is_null())
    }

    // =========================================================================
    // Tree operations
    // =========================================================================

    /// Recursively merge `overlay` into this tree.
    ///
    /// Overlapping leaf keys take the overlay's value; overlapping map keys
    /// merge recursively. Non-object overlays replace this value outright.
    pub fn deep_merge(&mut self, overlay: &ConfigValue) {
        match (self, overlay) {
            (ConfigValue::Object(base), ConfigValue::Object(other)) => {
                for (key, value) in other {
                    match base.get_mut(key) {
                        Some(existing) if existing.is_object() && value.is_object() => {
                            existing.deep_merge(value);
                        }
                        _ => {
                            base.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            (slot, other) => *slot = other.clone(),
        }
    }

    /// Flatten the tree into dot-separated leaf paths.
    ///
    /// Empty objects contribute their own path so allow-list checks see them.
    pub fn flatten_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(String::new(), &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: String, out: &mut Vec<String>) {
        match self {
            ConfigValue::Object(map) if !map.is_empty() => {
                for (key, value) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    value.collect_paths(path, out);
                }
            }
            _ => {
                if !prefix.is_empty() {
                    out.push(prefix);
                }
            }
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n as f64)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Number(f64::from(n))
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(items)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Object(map)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&ConfigValue> for serde_json::Value {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => serde_json::json!(n),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            ConfigValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
