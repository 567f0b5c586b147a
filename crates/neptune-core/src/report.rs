//! Report - one immutable snapshot of a full universe report.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A fetched full universe report.
///
/// The generation is assigned by the owning galaxy: 1 for its first
/// successful fetch, incremented by every refresh after that.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    generation: u64,
    fields: Map<String, Value>,
}

impl Report {
    /// Wrap a decoded report payload. The payload must be a JSON object.
    pub fn from_value(value: Value, generation: u64) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { generation, fields }),
            other => Err(Error::Malformed(format!(
                "report must be an object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Boolean scalar; accepts JSON booleans and 0/1 integers. Absent is false.
    pub fn flag(&self, name: &str) -> bool {
        match self.fields.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(other) => as_i64(other).is_some_and(|n| n != 0),
            None => false,
        }
    }

    /// Integer scalar, if present and numeric.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(as_i64)
    }

    /// Number of entries in `players`, `stars` or `fleets`.
    pub fn collection_len(&self, collection: &str) -> usize {
        match self.fields.get(collection) {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(map)) => map.len(),
            _ => 0,
        }
    }

    /// Look up one entry of a collection.
    ///
    /// Sequences are indexed by position; mappings by the decimal key.
    pub fn entry(&self, collection: &str, id: u64) -> Option<&Map<String, Value>> {
        match self.fields.get(collection)? {
            Value::Array(items) => usize::try_from(id).ok().and_then(|i| items.get(i))?.as_object(),
            Value::Object(map) => map.get(&id.to_string())?.as_object(),
            _ => None,
        }
    }

    /// Ids present in a collection, ascending.
    pub fn ids(&self, collection: &str) -> Vec<u64> {
        let mut ids: Vec<u64> = match self.fields.get(collection) {
            Some(Value::Array(items)) => (0..items.len() as u64).collect(),
            Some(Value::Object(map)) => map
                .keys()
                .filter_map(|key| match key.parse::<u64>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        tracing::debug!(
                            collection = %collection,
                            key = %key,
                            "Skipping non-numeric id"
                        );
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        ids.sort_unstable();
        ids
    }
}

/// Integer coercion that also accepts integral floats and numeric strings.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float coercion; the server sends coordinates as strings.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
