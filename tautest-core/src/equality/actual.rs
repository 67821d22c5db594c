use std::any::Any;

use indexmap::IndexMap;

use crate::data_node::DataNodeKind;
use crate::{DataNode, TraceableValue, Value};

/// Value recomputed every time it is compared.
pub trait LiveValue {
    fn get(&self) -> Value;
}

impl<F> LiveValue for F
where
    F: Fn() -> Value,
{
    fn get(&self) -> Value {
        self()
    }
}

/// Named value read from an external collaborator (a page element, a
/// device register) at comparison time.
pub trait ElementValue {
    /// Name used as the path of mismatches reported against this value.
    fn name(&self) -> &str;
    fn get(&self) -> Value;
}

/// Actual side of a comparison.
#[derive(Clone, Copy)]
pub enum Actual<'a> {
    Value(&'a Value),
    Node(&'a DataNode),
    Traceable(&'a TraceableValue),
    Live(&'a dyn LiveValue),
    Element(&'a dyn ElementValue),
    /// Kind introduced by a registered extension handler.
    Other(&'a dyn Any),
}

impl<'a> Actual<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Actual::Value(value) => value.kind_name(),
            Actual::Node(node) => match node.kind() {
                DataNodeKind::Scalar(value) => value.value().kind_name(),
                DataNodeKind::Struct(_) => "map",
                DataNodeKind::List(_) => "list",
                DataNodeKind::Missing => "missing",
            },
            Actual::Traceable(value) => value.value().kind_name(),
            Actual::Live(_) => "live value",
            Actual::Element(_) => "element value",
            Actual::Other(_) => "opaque",
        }
    }

    /// Renders the actual value for messages without triggering any checks.
    pub fn render(&self) -> String {
        match self {
            Actual::Value(value) => value.to_string(),
            Actual::Node(node) if node.is_missing() => "<missing>".to_string(),
            Actual::Node(node) => node.extract().to_string(),
            Actual::Traceable(value) => value.value().to_string(),
            Actual::Live(_) => "<live value>".to_string(),
            Actual::Element(element) => format!("<element {}>", element.name()),
            Actual::Other(_) => "<opaque>".to_string(),
        }
    }

    pub(crate) fn shape(&self) -> Shape<'a> {
        match *self {
            Actual::Value(value) => Shape::of_value(value),
            Actual::Traceable(value) => Shape::of_value(value.value()),
            Actual::Node(node) => match node.kind() {
                DataNodeKind::Scalar(value) => Shape::of_value(value.value()),
                DataNodeKind::Struct(children) => Shape::Map(MapView::Node(children)),
                DataNodeKind::List(elements) => {
                    Shape::List(elements.iter().map(Actual::Node).collect())
                }
                DataNodeKind::Missing => Shape::Absent,
            },
            Actual::Live(_) | Actual::Element(_) | Actual::Other(_) => Shape::Opaque,
        }
    }
}

impl<'a> From<&'a Value> for Actual<'a> {
    fn from(value: &'a Value) -> Self {
        Actual::Value(value)
    }
}

impl<'a> From<&'a DataNode> for Actual<'a> {
    fn from(node: &'a DataNode) -> Self {
        Actual::Node(node)
    }
}

impl<'a> From<&'a TraceableValue> for Actual<'a> {
    fn from(value: &'a TraceableValue) -> Self {
        Actual::Traceable(value)
    }
}

/// Structural view the default handlers dispatch on.
pub(crate) enum Shape<'a> {
    /// Missing key or index.
    Absent,
    Null,
    Scalar(&'a Value),
    List(Vec<Actual<'a>>),
    Map(MapView<'a>),
    /// Only extension handlers understand it.
    Opaque,
}

impl<'a> Shape<'a> {
    fn of_value(value: &'a Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::List(items) => Shape::List(items.iter().map(Actual::Value).collect()),
            Value::Map(entries) => Shape::Map(MapView::Raw(entries)),
            scalar => Shape::Scalar(scalar),
        }
    }
}

pub(crate) enum MapView<'a> {
    Raw(&'a IndexMap<String, Value>),
    Node(&'a IndexMap<String, DataNode>),
}

impl<'a> MapView<'a> {
    pub(crate) fn get(&self, key: &str) -> Option<Actual<'a>> {
        match *self {
            MapView::Raw(entries) => entries.get(key).map(Actual::Value),
            MapView::Node(children) => children.get(key).map(Actual::Node),
        }
    }

    pub(crate) fn entries(&self) -> Vec<(&'a str, Actual<'a>)> {
        match *self {
            MapView::Raw(entries) => entries
                .iter()
                .map(|(key, value)| (key.as_str(), Actual::Value(value)))
                .collect(),
            MapView::Node(children) => children
                .iter()
                .map(|(key, node)| (key.as_str(), Actual::Node(node)))
                .collect(),
        }
    }

    /// Response trees are matched partially: extra actual keys are allowed.
    pub(crate) fn is_partial(&self) -> bool {
        matches!(self, MapView::Node(_))
    }
}
