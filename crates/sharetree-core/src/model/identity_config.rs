use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identity configuration, shaped like the data it configures
///
/// - At a mapping key: a nested configuration for that key's value.
/// - At an array: a field name naming the identity field of its elements.
/// - At an array of arrays: one entry per element position of the outer
///   array.
///
/// Conversion from JSON (and therefore TOML) is total: entries that match
/// none of these shapes become [`IdentityConfig::Inferred`], which selects
/// the default policy at that level.
///
/// # Example
///
/// ```
/// use sharetree_core::IdentityConfig;
/// use serde_json::json;
///
/// let config: IdentityConfig = serde_json::from_value(json!({
///     "deep": { "deeper": [null, "customId"] }
/// })).unwrap();
///
/// let deeper = config.for_key("deep").and_then(|c| c.for_key("deeper")).unwrap();
/// assert_eq!(deeper.for_position(1).and_then(|c| c.explicit_field()), Some("customId"));
/// assert_eq!(deeper.for_position(0).and_then(|c| c.explicit_field()), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum IdentityConfig {
    /// No explicit entry; infer the identity field
    #[default]
    Inferred,
    /// Identity field name for the elements of an array
    Field(String),
    /// Per-key configuration of a mapping
    Keys(BTreeMap<String, IdentityConfig>),
    /// Per-position configuration of an array's elements
    Positions(Vec<IdentityConfig>),
}

impl IdentityConfig {
    pub fn field(name: impl Into<String>) -> Self {
        IdentityConfig::Field(name.into())
    }

    pub fn keys<K: Into<String>>(entries: impl IntoIterator<Item = (K, IdentityConfig)>) -> Self {
        IdentityConfig::Keys(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn positions(entries: impl IntoIterator<Item = IdentityConfig>) -> Self {
        IdentityConfig::Positions(entries.into_iter().collect())
    }

    /// The explicitly configured identity field, if this entry is one
    pub fn explicit_field(&self) -> Option<&str> {
        match self {
            IdentityConfig::Field(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Configuration for a mapping key. Only `Keys` entries have children.
    pub fn for_key(&self, key: &str) -> Option<&IdentityConfig> {
        match self {
            IdentityConfig::Keys(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Configuration for an array element. Only `Positions` entries have children.
    pub fn for_position(&self, index: usize) -> Option<&IdentityConfig> {
        match self {
            IdentityConfig::Positions(entries) => entries.get(index),
            _ => None,
        }
    }

    /// Visit every explicitly configured field name with its location,
    /// written as a path such as `deep.rows[1]`
    pub(crate) fn walk_fields<'a>(&'a self, visit: &mut impl FnMut(&str, &'a str)) {
        fn walk<'a>(
            config: &'a IdentityConfig,
            path: &mut String,
            visit: &mut impl FnMut(&str, &'a str),
        ) {
            match config {
                IdentityConfig::Inferred => {}
                IdentityConfig::Field(name) => visit(path.as_str(), name.as_str()),
                IdentityConfig::Keys(entries) => {
                    for (key, child) in entries {
                        let len = path.len();
                        if !path.is_empty() {
                            path.push('.');
                        }
                        path.push_str(key);
                        walk(child, path, visit);
                        path.truncate(len);
                    }
                }
                IdentityConfig::Positions(entries) => {
                    for (index, child) in entries.iter().enumerate() {
                        let len = path.len();
                        path.push_str(&format!("[{}]", index));
                        walk(child, path, visit);
                        path.truncate(len);
                    }
                }
            }
        }
        walk(self, &mut String::new(), visit);
    }
}

impl From<Value> for IdentityConfig {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => IdentityConfig::Field(name),
            Value::Object(entries) => IdentityConfig::Keys(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, IdentityConfig::from(v)))
                    .collect(),
            ),
            Value::Array(entries) => {
                IdentityConfig::Positions(entries.into_iter().map(IdentityConfig::from).collect())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => IdentityConfig::Inferred,
        }
    }
}

impl From<IdentityConfig> for Value {
    fn from(config: IdentityConfig) -> Self {
        match config {
            IdentityConfig::Inferred => Value::Null,
            IdentityConfig::Field(name) => Value::String(name),
            IdentityConfig::Keys(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            IdentityConfig::Positions(entries) => {
                Value::Array(entries.into_iter().map(Value::from).collect())
            }
        }
    }
}
