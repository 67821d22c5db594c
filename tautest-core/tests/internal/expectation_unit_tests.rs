use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::{DataNode, Value};
use serde_json::json;

fn body(value: serde_json::Value) -> DataNode {
    DataNode::from_value(ActualPath::new("body"), Value::from(value))
}

#[test]
fn mismatch_raises_without_installed_handlers() {
    let node = body(json!({"id": 1}));
    let error = node.get("id").should(equal(2)).expect_err("mismatch");

    assert!(error.is_mismatch());
    assert!(error.to_string().starts_with("body.id:"));
}

#[test]
fn terminating_handler_absorbs_mismatches() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = seen.clone();
    let node = body(json!({"id": 1, "name": "a"}));

    with_additional_handler(
        move |mismatch: &ValueMismatch| {
            recorder.borrow_mut().push(mismatch.message());
            Flow::Terminate
        },
        || {
            node.get("id").should(equal(2)).expect("absorbed");
            node.get("name").should(equal("b")).expect("absorbed");
        },
    );

    assert_eq!(seen.borrow().len(), 2);
    assert!(seen.borrow()[1].starts_with("body.name:"));
}

#[test]
fn pass_to_next_falls_through_to_the_default_raise() {
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();

    let result = with_additional_handler(
        move |_: &ValueMismatch| {
            *counter.borrow_mut() += 1;
            Flow::PassToNext
        },
        || actual(&Value::from(1)).should(equal(2)),
    );

    assert!(result.is_err());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn handlers_are_consulted_innermost_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let outer = order.clone();
    let inner = order.clone();

    with_additional_handler(
        move |_: &ValueMismatch| {
            outer.borrow_mut().push("outer");
            Flow::Terminate
        },
        || {
            with_additional_handler(
                move |_: &ValueMismatch| {
                    inner.borrow_mut().push("inner");
                    Flow::PassToNext
                },
                || actual(&Value::from(1)).should(equal(2)).expect("outer absorbs"),
            )
        },
    );

    assert_eq!(*order.borrow(), vec!["inner", "outer"]);
}

#[test]
fn scope_is_removed_after_a_panic() {
    let outcome = std::panic::catch_unwind(|| {
        with_additional_handler(|_: &ValueMismatch| Flow::Terminate, || panic!("boom"))
    });
    assert!(outcome.is_err());

    let result = actual(&Value::from(1)).should(equal(2));
    assert!(result.is_err(), "handler leaked past its scope");
}

#[test]
fn not_equal_fails_only_on_equal_values() {
    let value = Value::from("a");
    assert!(actual(&value).should(not_equal("b")).is_ok());

    let error = actual(&value).should(not_equal("a")).expect_err("equal values");
    assert!(error.to_string().contains("expected: not \"a\" <string>"));

    assert!(actual(&value).should_not(equal("b")).is_ok());
}

#[test]
fn comparator_faults_are_not_mismatches() {
    let opaque = 1_u8;
    let error = should(
        &ActualPath::new("value"),
        crate::equality::Actual::Other(&opaque),
        &equal(1),
    )
    .expect_err("unsupported");

    assert!(!error.is_mismatch());
}
