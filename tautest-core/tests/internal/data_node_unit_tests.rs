use super::*;
use crate::expectation::equal;
use serde_json::json;

fn tree(value: serde_json::Value) -> DataNode {
    DataNode::from_value(ActualPath::new("body"), Value::from(value))
}

#[test]
fn builds_structs_lists_and_scalars() {
    let node = tree(json!({"items": [{"id": 1}], "name": "x", "none": null}));

    assert!(matches!(node.kind(), DataNodeKind::Struct(_)));
    assert!(matches!(node.get("items").kind(), DataNodeKind::List(_)));
    assert!(matches!(node.get("name").kind(), DataNodeKind::Scalar(_)));
    assert_eq!(node.get("none").extract(), Value::Null);
    assert_eq!(node.len(), 3);
}

#[test]
fn child_paths_extend_the_parent() {
    let node = tree(json!({"items": [{"id": 1}]}));
    let id = node.get("items").at(0).get("id");

    assert_eq!(id.path().to_string(), "body.items[0].id");
    assert_eq!(id.extract(), Value::from(1));
}

#[test]
fn absent_children_are_missing_at_the_requested_path() {
    let node = tree(json!({"items": [1]}));

    let gone = node.get("nope");
    assert!(gone.is_missing());
    assert_eq!(gone.path().to_string(), "body.nope");

    let past_end = node.get("items").at(5);
    assert!(past_end.is_missing());
    assert_eq!(past_end.path().to_string(), "body.items[5]");

    let through_scalar = node.get("items").at(0).get("x");
    assert!(through_scalar.is_missing());
    assert_eq!(through_scalar.extract(), Value::Null);
}

#[test]
fn extract_strips_every_wrapper() {
    let original = json!({"b": [1, 2.5, "s", true, null], "a": {"c": {}}});
    let node = tree(original.clone());

    assert_eq!(node.extract().to_json(), original);
}

#[test]
fn clones_share_check_state() {
    let node = tree(json!({"status": 200}));
    let alias = node.clone();

    node.get("status").should(equal(200)).expect("matches");

    assert!(alias.ptr_eq(&node));
    assert_eq!(
        alias.get("status").check_level(),
        Some(CheckLevel::ExplicitAssert)
    );
}

#[test]
fn containers_have_no_check_level() {
    let node = tree(json!({"a": [1]}));

    assert_eq!(node.check_level(), None);
    assert_eq!(node.get("a").check_level(), None);
    assert_eq!(node.get("a").at(0).check_level(), Some(CheckLevel::None));
}

#[test]
fn serializes_as_the_raw_value() {
    let node = tree(json!({"a": [1, "x"]}));

    let text = serde_json::to_string(&node).expect("serialize");
    assert_eq!(text, r#"{"a":[1,"x"]}"#);
}

#[test]
fn children_and_elements_iterate_in_order() {
    let node = tree(json!({"z": 1, "a": 2, "list": [3, 4]}));

    let names: Vec<&str> = node.children().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["z", "a", "list"]);
    assert_eq!(node.get("list").elements().len(), 2);
    assert!(node.get("z").elements().is_empty());
}
