//! JSON canónico + blake3 para identificar planes de steps.

use std::collections::BTreeMap;

use serde_json::Value;

/// Serializa con claves de objeto ordenadas y sin espacios.
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let body: Vec<String> = sorted.into_iter()
                                          .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), to_canonical_json(v)))
                                          .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(to_canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}

pub fn hash_str(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}
