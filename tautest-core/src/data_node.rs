//! Tree view over actual data that tracks which scalars were checked.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::equality::Actual;
use crate::expectation::{self, ExpectationError, ValueMatcher};
use crate::{ActualPath, CheckLevel, TraceableValue, Value};

/// Shape of a [`DataNode`].
pub enum DataNodeKind {
    Scalar(TraceableValue),
    Struct(IndexMap<String, DataNode>),
    List(Vec<DataNode>),
    /// Sentinel for an absent key or index.
    Missing,
}

struct NodeInner {
    path: ActualPath,
    kind: DataNodeKind,
}

/// Handle to one node of a data tree.
///
/// Cloning is cheap and clones share identity, so a check recorded through
/// one handle is visible through every other.
#[derive(Clone)]
pub struct DataNode {
    inner: Arc<NodeInner>,
}

impl DataNode {
    /// Builds a tree from a raw value; child paths extend `path` by field
    /// name or index.
    pub fn from_value(path: ActualPath, value: Value) -> Self {
        let kind = match value {
            Value::Map(entries) => DataNodeKind::Struct(
                entries
                    .into_iter()
                    .map(|(name, child)| {
                        let child_path = path.property(name.as_str());
                        (name, DataNode::from_value(child_path, child))
                    })
                    .collect(),
            ),
            Value::List(items) => DataNodeKind::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, child)| DataNode::from_value(path.index(index), child))
                    .collect(),
            ),
            scalar => DataNodeKind::Scalar(TraceableValue::new(scalar)),
        };
        Self::with_kind(path, kind)
    }

    /// Wraps a single value without descending into it.
    pub fn scalar(path: ActualPath, value: impl Into<Value>) -> Self {
        Self::with_kind(path, DataNodeKind::Scalar(TraceableValue::new(value)))
    }

    pub fn missing(path: ActualPath) -> Self {
        Self::with_kind(path, DataNodeKind::Missing)
    }

    fn with_kind(path: ActualPath, kind: DataNodeKind) -> Self {
        Self {
            inner: Arc::new(NodeInner { path, kind }),
        }
    }

    pub fn path(&self) -> &ActualPath {
        &self.inner.path
    }

    pub fn kind(&self) -> &DataNodeKind {
        &self.inner.kind
    }

    /// Returns the named child, or a `Missing` node at the requested path.
    pub fn get(&self, name: &str) -> DataNode {
        match &self.inner.kind {
            DataNodeKind::Struct(children) => children
                .get(name)
                .cloned()
                .unwrap_or_else(|| DataNode::missing(self.path().property(name))),
            _ => DataNode::missing(self.path().property(name)),
        }
    }

    /// Returns the element at `index`, or a `Missing` node at the requested path.
    pub fn at(&self, index: usize) -> DataNode {
        match &self.inner.kind {
            DataNodeKind::List(elements) => elements
                .get(index)
                .cloned()
                .unwrap_or_else(|| DataNode::missing(self.path().index(index))),
            _ => DataNode::missing(self.path().index(index)),
        }
    }

    pub fn traceable(&self) -> Option<&TraceableValue> {
        match &self.inner.kind {
            DataNodeKind::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Check level of a scalar node; `None` for containers and missing nodes.
    pub fn check_level(&self) -> Option<CheckLevel> {
        self.traceable().map(TraceableValue::check_level)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.inner.kind, DataNodeKind::Missing)
    }

    /// Number of children for structs and lists, zero otherwise.
    pub fn len(&self) -> usize {
        match &self.inner.kind {
            DataNodeKind::Struct(children) => children.len(),
            DataNodeKind::List(elements) => elements.len(),
            DataNodeKind::Scalar(_) | DataNodeKind::Missing => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &DataNode)> {
        let children = match &self.inner.kind {
            DataNodeKind::Struct(children) => Some(children),
            _ => None,
        };
        children
            .into_iter()
            .flat_map(|children| children.iter().map(|(name, node)| (name.as_str(), node)))
    }

    pub fn elements(&self) -> &[DataNode] {
        match &self.inner.kind {
            DataNodeKind::List(elements) => elements,
            _ => &[],
        }
    }

    /// Strips every wrapper and returns the raw values. `Missing` becomes null.
    pub fn extract(&self) -> Value {
        match &self.inner.kind {
            DataNodeKind::Scalar(value) => value.value().clone(),
            DataNodeKind::Struct(children) => Value::Map(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.extract()))
                    .collect(),
            ),
            DataNodeKind::List(elements) => {
                Value::List(elements.iter().map(DataNode::extract).collect())
            }
            DataNodeKind::Missing => Value::Null,
        }
    }

    /// Asserts the node against `matcher` through the installed expectation handlers.
    pub fn should<M: ValueMatcher>(&self, matcher: M) -> Result<(), ExpectationError> {
        expectation::should(self.path(), Actual::Node(self), &matcher)
    }

    pub fn should_not<M: ValueMatcher>(&self, matcher: M) -> Result<(), ExpectationError> {
        expectation::should_not(self.path(), Actual::Node(self), &matcher)
    }

    /// Returns true when both handles point at the same node.
    pub fn ptr_eq(&self, other: &DataNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("DataNode");
        debug.field("path", &self.inner.path);
        match &self.inner.kind {
            DataNodeKind::Scalar(value) => debug.field("scalar", value),
            DataNodeKind::Struct(children) => debug.field("struct", children),
            DataNodeKind::List(elements) => debug.field("list", elements),
            DataNodeKind::Missing => debug.field("missing", &true),
        };
        debug.finish()
    }
}

impl Serialize for DataNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.extract().serialize(serializer)
    }
}

#[cfg(test)]
#[path = "../tests/internal/data_node_unit_tests.rs"]
mod tests;
