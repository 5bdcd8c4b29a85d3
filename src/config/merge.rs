//! Layer merging
//!
//! - Tables: merged key by key
//! - Arrays: replaced by the later layer
//! - Scalars: later layer wins

use serde_json::Value;

/// Apply `top` over `base`.
pub fn overlay(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Object(mut merged), Value::Object(top)) => {
            for (key, value) in top {
                let value = match merged.remove(&key) {
                    Some(existing) => overlay(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, top) => top,
    }
}

/// Fold layers in order; the last has the highest precedence.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, overlay)
}
