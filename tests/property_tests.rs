//! Property tests for merging, path evaluation and projection.

use indexmap::IndexMap;
use proptest::prelude::*;
use unifio::config::Config;
use unifio::document::merge::{merge, merge_all};
use unifio::document::node::Value;
use unifio::jsonpath::evaluate;
use unifio::projection::project;

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<IndexMap<_, _>>())),
        ]
    })
}

/// Object whose keys all start with `prefix`, so two such maps never share keys.
fn arb_prefixed_object(prefix: &'static str) -> impl Strategy<Value = IndexMap<String, Value>> {
    prop::collection::vec(("[a-z]{1,4}", arb_value()), 0..5).prop_map(move |entries| {
        entries
            .into_iter()
            .map(|(key, value)| (format!("{}{}", prefix, key), value))
            .collect()
    })
}

proptest! {
    #[test]
    fn disjoint_objects_merge_to_union(
        left in arb_prefixed_object("l_"),
        right in arb_prefixed_object("r_"),
    ) {
        let merged = merge(&Value::Object(left.clone()), &Value::Object(right.clone()));
        let map = merged.as_object().unwrap();

        prop_assert_eq!(map.len(), left.len() + right.len());
        for (key, value) in left.iter().chain(right.iter()) {
            prop_assert_eq!(map.get(key), Some(value));
        }
        let keys: Vec<&String> = map.keys().collect();
        let expected: Vec<&String> = left.keys().chain(right.keys()).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn list_merge_concatenates(
        left in prop::collection::vec(arb_value(), 0..6),
        right in prop::collection::vec(arb_value(), 0..6),
    ) {
        let merged = merge(&Value::Array(left.clone()), &Value::Array(right.clone()));
        let items = merged.as_array().unwrap();

        prop_assert_eq!(items.len(), left.len() + right.len());
        prop_assert_eq!(&items[..left.len()], &left[..]);
        prop_assert_eq!(&items[left.len()..], &right[..]);
    }

    #[test]
    fn scalar_source_always_wins(target in arb_value(), source in arb_scalar()) {
        prop_assert_eq!(merge(&target, &source), source);
    }

    #[test]
    fn merge_leaves_inputs_untouched(a in arb_value(), b in arb_value()) {
        let (a_before, b_before) = (a.clone(), b.clone());
        let _ = merge_all([&a, &b]);
        prop_assert_eq!(a, a_before);
        prop_assert_eq!(b, b_before);
    }

    #[test]
    fn missing_property_matches_nothing(doc in arb_value(), segments in prop::collection::vec("[a-z]{1,4}", 0..3)) {
        let mut path = String::from("$");
        for segment in &segments {
            path.push('.');
            path.push_str(segment);
        }
        path.push_str(".MISSING");
        prop_assert!(evaluate(&doc, &path).unwrap().is_empty());
    }

    #[test]
    fn paths_without_root_are_rejected(doc in arb_value(), path in "[a-z.\\[\\]0-9]{0,10}") {
        prop_assert!(evaluate(&doc, &path).is_err());
    }

    #[test]
    fn projection_respects_array_cap(count in 0usize..60, cap in 1usize..20) {
        let items: Vec<Value> = (0..count as i64).map(Value::from).collect();
        let mut root = IndexMap::new();
        root.insert("items".to_string(), Value::Array(items));
        let doc = Value::Object(root);
        let template: Value = serde_json::from_str(r#"{"all":"$.items[*]"}"#).unwrap();
        let config = Config { array_cap: cap, ..Config::default() };

        let projection = project(&template, &doc, &config);

        prop_assert_eq!(projection.metadata.truncated, count > cap);
        match projection.value.get("all").unwrap() {
            Value::Array(kept) => prop_assert!(kept.len() <= cap),
            Value::Null => prop_assert_eq!(count, 0),
            _ => prop_assert_eq!(count, 1),
        }
    }
}
