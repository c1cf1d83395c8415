use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::error::AppResult;

/// Normalized request signature for the fetch cache.
///
/// Renders as `endpoint?{json}` where every object in the parameters has its
/// keys sorted, so field order at the call site never changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key from an endpoint identity and any serializable parameter set
    pub fn new<P: Serialize + ?Sized>(endpoint: &str, params: &P) -> AppResult<Self> {
        let value = serde_json::to_value(params)?;
        Ok(Self::from_value(endpoint, value))
    }

    /// Builds a key from `(name, value)` pairs supplied in any order
    pub fn from_pairs<K, V>(endpoint: &str, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), Value::String(v.as_ref().to_string())))
            .collect();
        Self::from_value(endpoint, Value::Object(params))
    }

    fn from_value(endpoint: &str, params: Value) -> Self {
        let mut rendered = String::with_capacity(endpoint.len() + 32);
        rendered.push_str(endpoint);
        rendered.push('?');
        write_canonical(&params, &mut rendered);
        Self(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
