//! Deep merge of configuration documents.
//!
//! Nested mappings are merged key by key; every other value (including lists
//! and nulls) replaces the lower layer's value outright.

use serde_json::Value;

use super::Document;

/// Merges `overlay` into `base`, with `overlay` winning on conflicts.
pub fn deep_merge(base: &mut Document, overlay: Document) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base_table)), Value::Object(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merges layers lowest-precedence first.
pub fn merge_layers(layers: impl IntoIterator<Item = Document>) -> Document {
    layers.into_iter().fold(Document::new(), |mut merged, layer| {
        deep_merge(&mut merged, layer);
        merged
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_overlay_scalar_wins() {
        let mut base = doc(json!({"a": 1, "b": 2}));
        deep_merge(&mut base, doc(json!({"b": 3, "c": 4})));
        assert_eq!(Value::Object(base), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_nested_tables_merge() {
        let mut base = doc(json!({
            "network": {"vpc_cidr": "10.0.0.0/16", "nat_gateways": 1},
            "aws": {"region": "us-east-1"}
        }));
        deep_merge(&mut base, doc(json!({"network": {"nat_gateways": 3}})));
        assert_eq!(
            Value::Object(base),
            json!({
                "network": {"vpc_cidr": "10.0.0.0/16", "nat_gateways": 3},
                "aws": {"region": "us-east-1"}
            })
        );
    }

    #[test]
    fn test_lists_replace_wholesale() {
        let mut base = doc(json!({"azs": ["a", "b", "c"]}));
        deep_merge(&mut base, doc(json!({"azs": ["d"]})));
        assert_eq!(Value::Object(base), json!({"azs": ["d"]}));
    }

    #[test]
    fn test_mapping_replaces_scalar_and_back() {
        let mut base = doc(json!({"x": 1, "y": {"z": true}}));
        deep_merge(&mut base, doc(json!({"x": {"nested": 1}, "y": "flat"})));
        assert_eq!(Value::Object(base), json!({"x": {"nested": 1}, "y": "flat"}));
    }

    #[test]
    fn test_top_layer_wins_across_three_layers() {
        let merged = merge_layers([
            doc(json!({"k": "base", "only_base": 1})),
            doc(json!({"k": "named", "only_named": 2})),
            doc(json!({"k": "env"})),
        ]);
        assert_eq!(
            Value::Object(merged),
            json!({"k": "env", "only_base": 1, "only_named": 2})
        );
    }

    #[test]
    fn test_disjoint_keys_are_order_independent() {
        let a = doc(json!({"a": {"x": 1}}));
        let b = doc(json!({"b": {"y": 2}}));
        assert_eq!(
            merge_layers([a.clone(), b.clone()]),
            merge_layers([b, a])
        );
    }
}
