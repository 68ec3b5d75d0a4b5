//! Integration tests for path parsing and evaluation.

use unifio::document::node::Value;
use unifio::jsonpath::{evaluate, Parser, PathToken};

fn doc() -> Value {
    serde_json::from_str(
        r#"{
            "store": {
                "book": [
                    {"title": "Sayings", "price": 8.95},
                    {"title": "Sword", "price": 12.99},
                    {"title": "Moby", "price": 8.99}
                ],
                "first-name": "Ann",
                "bicycle": {"color": "red"}
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_root_returns_whole_document() {
    let doc = doc();
    let results = evaluate(&doc, "$").unwrap();
    assert_eq!(results, vec![&doc]);
}

#[test]
fn test_property_chain() {
    let doc = doc();
    let results = evaluate(&doc, "$.store.bicycle.color").unwrap();
    assert_eq!(results, vec![&Value::from("red")]);
}

#[test]
fn test_bracket_notation_and_hyphenated_names() {
    let doc = doc();
    assert_eq!(evaluate(&doc, "$['store']['first-name']").unwrap(), vec![&Value::from("Ann")]);
    assert_eq!(evaluate(&doc, "$.store.first-name").unwrap(), vec![&Value::from("Ann")]);
}

#[test]
fn test_wildcard_then_property_preserves_order() {
    let doc = doc();
    let titles: Vec<&str> = evaluate(&doc, "$.store.book[*].title")
        .unwrap()
        .into_iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(titles, vec!["Sayings", "Sword", "Moby"]);
}

#[test]
fn test_negative_and_out_of_range_indexes() {
    let doc = doc();
    assert_eq!(
        evaluate(&doc, "$.store.book[-1].title").unwrap(),
        vec![&Value::from("Moby")]
    );
    assert!(evaluate(&doc, "$.store.book[3]").unwrap().is_empty());
    assert!(evaluate(&doc, "$.store.book[-4]").unwrap().is_empty());
}

#[test]
fn test_wildcard_on_object_matches_nothing() {
    let doc = doc();
    assert!(evaluate(&doc, "$.store.bicycle[*]").unwrap().is_empty());
    assert!(evaluate(&doc, "$.store.*").unwrap().is_empty());
}

#[test]
fn test_type_mismatch_yields_empty() {
    let doc = doc();
    assert!(evaluate(&doc, "$.store.book.title").unwrap().is_empty());
    assert!(evaluate(&doc, "$.store.bicycle[0]").unwrap().is_empty());
}

#[test]
fn test_parser_tokens() {
    let path = Parser::parse("$.a[0]['b c'][*]").unwrap();
    assert_eq!(
        path.tokens,
        vec![
            PathToken::Property("a".to_string()),
            PathToken::Index(0),
            PathToken::Property("b c".to_string()),
            PathToken::Wildcard,
        ]
    );
}

#[test]
fn test_malformed_paths_fail() {
    let doc = doc();
    for path in ["", "store", "$.", "$[", "$[]", "$['a", "$..book", "$.a[x]", "$ .a"] {
        assert!(evaluate(&doc, path).is_err(), "expected error for {:?}", path);
    }
}
