use std::sync::Arc;

use serde_json::Number;

use super::{Actual, ComparatorError, EqualComparator, EqualHandler, MapView, Shape};
use crate::{ActualPath, Expected, Value};

pub(super) fn default_handlers() -> Vec<Arc<dyn EqualHandler>> {
    vec![
        Arc::new(TraceableHandler),
        Arc::new(NullHandler),
        Arc::new(NumberHandler),
        Arc::new(StringHandler),
        Arc::new(ListHandler),
        Arc::new(MapHandler),
        Arc::new(ScalarHandler),
    ]
}

pub(super) fn builtin_extensions() -> Vec<Arc<dyn EqualHandler>> {
    vec![Arc::new(LiveValueHandler), Arc::new(ElementValueHandler)]
}

fn describe_actual(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format!("{other} <{}>", other.kind_name()),
    }
}

fn difference(actual: &str, expected: &Expected) -> String {
    format!("  actual: {actual}\nexpected: {}", expected.describe())
}

/// Unwraps traceable scalars, marking them as explicitly asserted.
struct TraceableHandler;

impl EqualHandler for TraceableHandler {
    fn handles(&self, actual: &Actual<'_>, _expected: &Expected) -> bool {
        match actual {
            Actual::Traceable(_) => true,
            Actual::Node(node) => node.traceable().is_some(),
            _ => false,
        }
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let traceable = match actual {
            Actual::Traceable(value) => Some(value),
            Actual::Node(node) => node.traceable(),
            _ => None,
        };
        let Some(traceable) = traceable else {
            return Ok(());
        };
        traceable.mark_explicit_assert();
        comparator.compare(path, Actual::Value(traceable.value()), expected)
    }
}

struct NullHandler;

impl EqualHandler for NullHandler {
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool {
        match actual.shape() {
            Shape::Opaque => false,
            Shape::Absent | Shape::Null => true,
            _ => expected.is_null(),
        }
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        match actual.shape() {
            Shape::Absent if expected.is_null() => {}
            Shape::Null if expected.is_null() => {}
            Shape::Absent => comparator.report(
                path,
                "<missing>",
                format!("is missing\nexpected: {}", expected.describe()),
            ),
            Shape::Null => comparator.report(path, "null", difference("null", expected)),
            Shape::Scalar(value) => {
                let rendered = describe_actual(value);
                comparator.report(path, value.to_string(), difference(&rendered, expected));
            }
            _ => {
                let rendered = actual.render();
                let described = format!("{rendered} <{}>", actual.kind_name());
                comparator.report(path, rendered, difference(&described, expected));
            }
        }
        Ok(())
    }
}

/// Numbers compare by value regardless of integer or float representation.
struct NumberHandler;

fn as_integer(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

fn numbers_equal(actual: &Number, expected: &Number) -> bool {
    match (as_integer(actual), as_integer(expected)) {
        (Some(left), Some(right)) => left == right,
        _ => match (actual.as_f64(), expected.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        },
    }
}

impl EqualHandler for NumberHandler {
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool {
        matches!(expected, Expected::Number(_))
            && matches!(actual.shape(), Shape::Scalar(Value::Number(_)))
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let (Shape::Scalar(value), Expected::Number(right)) = (actual.shape(), expected) else {
            return Ok(());
        };
        if let Value::Number(left) = value {
            if !numbers_equal(left, right) {
                let described = describe_actual(value);
                comparator.report(path, value.to_string(), difference(&described, expected));
            }
        }
        Ok(())
    }
}

/// Plain string equality, plus full-string pattern matching against any
/// scalar's rendered text.
struct StringHandler;

impl EqualHandler for StringHandler {
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool {
        match (actual.shape(), expected) {
            (Shape::Scalar(Value::String(_)), Expected::String(_)) => true,
            (Shape::Scalar(Value::Bytes(_)), Expected::Pattern(_)) => false,
            (Shape::Scalar(_), Expected::Pattern(_)) => true,
            _ => false,
        }
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let Shape::Scalar(value) = actual.shape() else {
            return Ok(());
        };
        let matched = match (value, expected) {
            (Value::String(text), Expected::String(wanted)) => text == wanted,
            (Value::String(text), Expected::Pattern(pattern)) => pattern.is_full_match(text),
            (other, Expected::Pattern(pattern)) => pattern.is_full_match(&other.to_string()),
            _ => false,
        };
        if !matched {
            let described = describe_actual(value);
            comparator.report(path, value.to_string(), difference(&described, expected));
        }
        Ok(())
    }
}

struct ListHandler;

impl EqualHandler for ListHandler {
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool {
        matches!(expected, Expected::List(_)) && matches!(actual.shape(), Shape::List(_))
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let (Shape::List(items), Expected::List(wanted)) = (actual.shape(), expected) else {
            return Ok(());
        };
        if items.len() != wanted.len() {
            comparator.report(
                path,
                actual.render(),
                format!(
                    "  actual: list of size {}\nexpected: list of size {}",
                    items.len(),
                    wanted.len()
                ),
            );
            return Ok(());
        }
        for (index, (item, expected_item)) in items.into_iter().zip(wanted).enumerate() {
            comparator.compare(&path.index(index), item, expected_item)?;
        }
        Ok(())
    }
}

/// Compares every expected key. Raw maps also reject keys the expectation
/// does not mention; data-node structs do not.
struct MapHandler;

impl EqualHandler for MapHandler {
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool {
        matches!(expected, Expected::Map(_)) && matches!(actual.shape(), Shape::Map(_))
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let (Shape::Map(view), Expected::Map(wanted)) = (actual.shape(), expected) else {
            return Ok(());
        };
        for (key, expected_child) in wanted {
            let child_path = path.property(key.as_str());
            match view.get(key) {
                Some(child) => comparator.compare(&child_path, child, expected_child)?,
                None if expected_child.is_null() => {}
                None => comparator.report(
                    &child_path,
                    "<missing>",
                    format!("is missing\nexpected: {}", expected_child.describe()),
                ),
            }
        }
        if !view.is_partial() {
            report_unexpected_keys(comparator, path, &view, wanted);
        }
        Ok(())
    }
}

fn report_unexpected_keys(
    comparator: &mut EqualComparator,
    path: &ActualPath,
    view: &MapView<'_>,
    wanted: &indexmap::IndexMap<String, Expected>,
) {
    for (key, child) in view.entries() {
        if wanted.contains_key(key) {
            continue;
        }
        let rendered = child.render();
        let message = format!(
            "unexpected key\n  actual: {rendered} <{}>",
            child.kind_name()
        );
        comparator.report(&path.property(key), rendered, message);
    }
}

/// Fallback: same-kind scalars compare by equality, anything else is a type
/// mismatch.
struct ScalarHandler;

impl EqualHandler for ScalarHandler {
    fn handles(&self, actual: &Actual<'_>, _expected: &Expected) -> bool {
        !matches!(actual.shape(), Shape::Opaque)
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let equal = match (actual.shape(), expected) {
            (Shape::Scalar(Value::Bool(left)), Expected::Bool(right)) => left == right,
            (Shape::Scalar(Value::Bytes(left)), Expected::Bytes(right)) => left == right,
            (Shape::Scalar(Value::String(left)), Expected::String(right)) => left == right,
            (Shape::Scalar(Value::Number(left)), Expected::Number(right)) => {
                numbers_equal(left, right)
            }
            _ => false,
        };
        if !equal {
            let rendered = actual.render();
            let described = format!("{rendered} <{}>", actual.kind_name());
            comparator.report(path, rendered, difference(&described, expected));
        }
        Ok(())
    }
}

/// Recomputes a live value and compares the result at the same path.
struct LiveValueHandler;

impl EqualHandler for LiveValueHandler {
    fn handles(&self, actual: &Actual<'_>, _expected: &Expected) -> bool {
        matches!(actual, Actual::Live(_))
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let Actual::Live(live) = actual else {
            return Ok(());
        };
        let value = live.get();
        comparator.compare(path, Actual::Value(&value), expected)
    }
}

/// Reads an element value and compares it under the element's own name.
struct ElementValueHandler;

impl EqualHandler for ElementValueHandler {
    fn handles(&self, actual: &Actual<'_>, _expected: &Expected) -> bool {
        matches!(actual, Actual::Element(_))
    }

    fn compare(
        &self,
        comparator: &mut EqualComparator,
        _path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let Actual::Element(element) = actual else {
            return Ok(());
        };
        let value = element.get();
        comparator.compare(&ActualPath::new(element.name()), Actual::Value(&value), expected)
    }
}
