use super::*;
use crate::{CheckLevel, DataNode, TraceableValue, Value};
use serde_json::json;

fn compare(actual: Actual<'_>, expected: impl Into<Expected>) -> Vec<Mismatch> {
    let mut comparator = EqualComparator::new();
    comparator
        .compare(&ActualPath::new("value"), actual, &expected.into())
        .expect("comparison supported");
    comparator.into_mismatches()
}

fn raw(value: serde_json::Value) -> Value {
    Value::from(value)
}

#[test]
fn raw_map_reports_missing_and_unexpected_keys() {
    let actual = raw(json!({"a": 1, "c": 3}));
    let mismatches = compare(Actual::Value(&actual), json!({"a": 1, "b": 2}));

    assert_eq!(mismatches.len(), 2);
    assert_eq!(mismatches[0].path.to_string(), "value.b");
    assert!(mismatches[0].message.starts_with("is missing"));
    assert_eq!(mismatches[1].path.to_string(), "value.c");
    assert!(mismatches[1].message.starts_with("unexpected key"));
}

#[test]
fn map_reports_every_differing_key() {
    let actual = raw(json!({"a": 1, "b": "x", "c": true}));
    let mismatches = compare(
        Actual::Value(&actual),
        json!({"a": 2, "b": "y", "c": true}),
    );

    let paths: Vec<String> = mismatches.iter().map(|m| m.path.to_string()).collect();
    assert_eq!(paths, vec!["value.a", "value.b"]);
}

#[test]
fn list_length_difference_is_reported_once() {
    let actual = raw(json!([1, 2]));
    let mismatches = compare(Actual::Value(&actual), json!([1, 5, 3]));

    assert_eq!(mismatches.len(), 1);
    assert_eq!(
        mismatches[0].message,
        "  actual: list of size 2\nexpected: list of size 3"
    );
}

#[test]
fn list_elements_are_compared_by_index() {
    let actual = raw(json!([{"id": 1}, {"id": 2}]));
    let mismatches = compare(Actual::Value(&actual), json!([{"id": 1}, {"id": 3}]));

    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].path.to_string(), "value[1].id");
    assert_eq!(mismatches[0].actual, "2");
}

#[test]
fn numbers_compare_across_representations() {
    let integer = Value::from(1);
    let float = Value::from(1.0);
    assert!(compare(Actual::Value(&integer), 1.0).is_empty());
    assert!(compare(Actual::Value(&float), 1).is_empty());
    assert_eq!(compare(Actual::Value(&float), 2).len(), 1);

    let large = Value::from(u64::MAX);
    assert!(compare(Actual::Value(&large), u64::MAX).is_empty());
    assert_eq!(compare(Actual::Value(&large), -1).len(), 1);
}

#[test]
fn patterns_match_whole_rendered_scalars() {
    let text = Value::from("order-42");
    let number = Value::from(42);
    let pattern = Expected::pattern("order-\\d+").expect("pattern");

    assert!(compare(Actual::Value(&text), pattern.clone()).is_empty());
    assert!(compare(Actual::Value(&number), Expected::pattern("\\d+").expect("pattern")).is_empty());

    let prefixed = Value::from("my-order-42");
    let mismatches = compare(Actual::Value(&prefixed), pattern);
    assert_eq!(mismatches.len(), 1);
    assert!(mismatches[0].message.contains("/order-\\d+/ <pattern>"));
}

#[test]
fn missing_node_equals_expected_null() {
    let body = DataNode::from_value(ActualPath::new("body"), raw(json!({"a": 1})));
    let missing = body.get("gone");

    assert!(compare(Actual::Node(&missing), Expected::Null).is_empty());

    let mismatches = compare(Actual::Node(&missing), 1);
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].actual, "<missing>");
}

#[test]
fn node_structs_allow_extra_keys() {
    let body = DataNode::from_value(ActualPath::new("body"), raw(json!({"a": 1, "extra": 2})));
    let mismatches = compare(Actual::Node(&body), json!({"a": 1}));

    assert!(mismatches.is_empty());
}

#[test]
fn comparison_marks_touched_scalars_only() {
    let body = DataNode::from_value(ActualPath::new("body"), raw(json!({"a": 1, "b": 2})));
    compare(Actual::Node(&body), json!({"a": 1}));

    assert_eq!(body.get("a").check_level(), Some(CheckLevel::ExplicitAssert));
    assert_eq!(body.get("b").check_level(), Some(CheckLevel::None));
}

#[test]
fn mismatches_on_node_children_use_the_child_path() {
    let body = DataNode::from_value(
        ActualPath::new("body"),
        raw(json!({"items": [{"id": 7}]})),
    );
    let mut comparator = EqualComparator::new();
    comparator
        .compare(body.path(), Actual::Node(&body), &json!({"items": [{"id": 8}]}).into())
        .expect("supported");

    let mismatches = comparator.into_mismatches();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].path.to_string(), "body.items[0].id");
}

#[test]
fn type_difference_is_a_single_mismatch() {
    let actual = Value::from("1");
    let mismatches = compare(Actual::Value(&actual), 1);

    assert_eq!(mismatches.len(), 1);
    assert_eq!(
        mismatches[0].message,
        "  actual: \"1\" <string>\nexpected: 1 <number>"
    );
}

#[test]
fn traceable_values_are_unwrapped_and_marked() {
    let traceable = TraceableValue::new("ok");
    assert!(compare(Actual::Traceable(&traceable), "ok").is_empty());
    assert_eq!(traceable.check_level(), CheckLevel::ExplicitAssert);
}

#[test]
fn live_values_are_recomputed_at_comparison_time() {
    let counter = std::cell::Cell::new(0);
    let live = || {
        counter.set(counter.get() + 1);
        Value::from(counter.get())
    };

    assert!(compare(Actual::Live(&live), 1).is_empty());
    assert!(compare(Actual::Live(&live), 2).is_empty());
}

struct Label;

impl ElementValue for Label {
    fn name(&self) -> &str {
        "submit button"
    }

    fn get(&self) -> Value {
        Value::from("Send")
    }
}

#[test]
fn element_mismatches_are_reported_under_the_element_name() {
    let mismatches = compare(Actual::Element(&Label), "Submit");

    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].path.to_string(), "submit button");
}

#[test]
fn opaque_actuals_without_a_handler_are_a_fault() {
    let opaque = 5_u8;
    let mut comparator = EqualComparator::new();
    let error = comparator
        .compare(&ActualPath::new("value"), Actual::Other(&opaque), &Expected::from(5))
        .expect_err("unsupported");

    assert!(matches!(
        error,
        ComparatorError::Unsupported { actual: "opaque", expected: "number", .. }
    ));
    assert!(!comparator.has_mismatches());
}

struct Celsius(f64);

struct CelsiusHandler;

impl EqualHandler for CelsiusHandler {
    fn handles(&self, actual: &Actual<'_>, _expected: &Expected) -> bool {
        matches!(actual, Actual::Other(any) if any.is::<Celsius>())
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let Actual::Other(any) = actual else {
            return Ok(());
        };
        let Some(celsius) = any.downcast_ref::<Celsius>() else {
            return Ok(());
        };
        let value = Value::from(celsius.0.round());
        comparator.compare(path, Actual::Value(&value), expected)
    }
}

#[test]
fn explicit_extension_table_is_consulted_before_defaults() {
    let table: Arc<Vec<Arc<dyn EqualHandler>>> = Arc::new(vec![Arc::new(CelsiusHandler)]);
    let mut comparator = EqualComparator::with_extensions(table);
    comparator
        .compare(&ActualPath::new("temp"), Actual::Other(&Celsius(21.4)), &Expected::from(21.0))
        .expect("handled by extension");

    assert!(!comparator.has_mismatches());
}

#[test]
fn mismatch_display_indents_continuation_lines() {
    let mismatch = Mismatch {
        path: ActualPath::new("body").property("id"),
        actual: "1".to_string(),
        message: "  actual: 1 <number>\nexpected: 2 <number>".to_string(),
    };

    assert_eq!(
        mismatch.to_string(),
        "body.id:   actual: 1 <number>\n         expected: 2 <number>"
    );
}
