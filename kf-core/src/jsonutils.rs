use std::collections::BTreeMap;

use serde_json::{
    Map,
    Value,
};

// Rebuild a JSON document with the keys of every object in lexicographic order.  serde_json's Map
// is only sorted when the `preserve_order` feature is off, and any crate in the build graph can
// turn that on, so we can't rely on it for stable output.
pub fn order_json(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map.into_iter().map(|(k, v)| (k, order_json(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<_, _>>())
        },
        Value::Array(items) => Value::Array(items.into_iter().map(order_json).collect()),
        other => other,
    }
}
