//! # Record Base
//!
//! Field containers shared by every record sent to the gateway.
//!
//! Each record type declares an ordered list of required field names.
//! Callers may bind extra fields at any time; `flatten` checks *every*
//! field present in the record, declared or not, before handing out the
//! flat key/value map used to build the outbound request.

use crate::error::{GatewayError, GatewayResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule deciding which scalar values count as "empty"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emptiness {
    /// Null, `false`, `""`, `"0"`, `0` and `0.0` are all empty.
    ///
    /// This is what the gateway's reference client enforces, and it
    /// rejects zero amounts (e.g. a $0 card verification).
    #[default]
    Loose,
    /// Same as `Loose`, except numeric zero and `"0"` count as populated.
    AllowZero,
}

/// A scalar field value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// Check emptiness under the given rule
    pub fn is_empty_under(&self, rule: Emptiness) -> bool {
        let zero_is_empty = rule == Emptiness::Loose;
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Integer(n) => *n == 0 && zero_is_empty,
            FieldValue::Decimal(f) => *f == 0.0 && zero_is_empty,
            FieldValue::Text(s) => s.is_empty() || (s == "0" && zero_is_empty),
        }
    }

    /// Check emptiness under the default (loose) rule
    pub fn is_empty(&self) -> bool {
        self.is_empty_under(Emptiness::Loose)
    }

    /// Borrow the text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders the value the way it is placed in a query string.
/// Booleans encode as `1`/`0`, null as an empty string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", if *b { "1" } else { "0" }),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = String;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .or_else(|| n.as_f64().map(FieldValue::Decimal))
                .ok_or_else(|| format!("number {} is out of range", n)),
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Array(_) => Err("arrays are not scalar".to_string()),
            Value::Object(_) => Err("objects are not scalar".to_string()),
        }
    }
}

/// Insertion-ordered map of field name to value.
///
/// Inserting an existing key overwrites it in place, so the position of
/// a field is fixed by the first time it was set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap {
    entries: IndexMap<String, FieldValue>,
}

impl FieldMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create a map with the given fields declared and unset
    pub fn declare(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|name| (name.to_string(), FieldValue::Null))
                .collect(),
        }
    }

    /// Set a field, overwriting any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    /// Get a field rendered as a parameter string
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Merge another map into this one; keys from `other` win
    pub fn merge(&mut self, other: &FieldMap) {
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Render as `(name, value)` string pairs for URL encoding
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Common behavior of every record sent to the gateway.
///
/// Implementors only expose their field storage; binding, verification
/// and flattening are shared.
pub trait Record {
    /// Borrow the record's fields
    fn fields(&self) -> &FieldMap;

    /// Mutably borrow the record's fields
    fn fields_mut(&mut self) -> &mut FieldMap;

    /// Set a single field
    fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>)
    where
        Self: Sized,
    {
        self.fields_mut().insert(name, value);
    }

    /// Builder: set a single field
    fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self
    where
        Self: Sized,
    {
        self.set(name, value);
        self
    }

    /// Overwrite or create fields from the given pairs. No validation.
    fn bind<I, K, V>(&mut self, fields: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (name, value) in fields {
            self.fields_mut().insert(name, value);
        }
    }

    /// Overwrite or create fields from a JSON object.
    ///
    /// Fails on the first non-scalar value; fields before it stay bound.
    fn bind_json(
        &mut self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> GatewayResult<()> {
        for (name, raw) in object {
            let value = FieldValue::try_from(raw).map_err(|message| GatewayError::InvalidField {
                field: name.clone(),
                message,
            })?;
            self.fields_mut().insert(name.clone(), value);
        }
        Ok(())
    }

    /// Fail on the first empty field, in field order
    fn verify(&self, rule: Emptiness) -> GatewayResult<()> {
        match self.fields().iter().find(|(_, value)| value.is_empty_under(rule)) {
            Some((name, _)) => Err(GatewayError::Validation {
                field: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Verify under the default rule, then copy out all fields
    fn flatten(&self) -> GatewayResult<FieldMap> {
        self.flatten_with(Emptiness::default())
    }

    /// Verify under `rule`, then copy out all fields
    fn flatten_with(&self, rule: Emptiness) -> GatewayResult<FieldMap> {
        self.verify(rule)?;
        Ok(self.fields().clone())
    }
}
