//! Shallow merge of proposed session fragments.
//!
//! A fragment replaces whole top-level keys; nested records are never merged
//! field by field. Callers re-validate the merged session before using it.
use serde_json::{Map, Value};

/// Merge a fragment into a raw session value (later fragment wins per key).
///
/// A non-object base is replaced by an empty object first.
pub fn merge_fragment_value(base: &Value, fragment: &Map<String, Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in fragment {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fragment must be an object"),
        }
    }

    #[test]
    fn later_fragment_replaces_whole_top_level_keys() {
        let base = json!({
            "setupType": "feature",
            "metadata": {"name": "Upload", "cloud": "Sales Cloud"}
        });
        let merged = merge_fragment_value(
            &base,
            &fragment(json!({"metadata": {"name": "Smart Upload"}})),
        );
        assert_eq!(merged["setupType"], "feature");
        assert_eq!(merged["metadata"], json!({"name": "Smart Upload"}));
    }

    #[test]
    fn non_object_base_starts_empty() {
        let merged = merge_fragment_value(
            &json!(["not", "a", "session"]),
            &fragment(json!({"setupType": "agent-setup", "agentforce": {"needed": true}})),
        );
        assert_eq!(
            merged,
            json!({"setupType": "agent-setup", "agentforce": {"needed": true}})
        );
    }
}
