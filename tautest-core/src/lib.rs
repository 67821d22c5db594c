//! Structural expectation engine for test automation.
//!
//! Actual data is wrapped in [`DataNode`] trees that remember which scalars
//! were asserted on. Assertions go through [`equality::EqualComparator`], a
//! priority-ordered table of comparison handlers, and the mismatches they
//! find are routed through a per-thread [`expectation`] handler stack. The
//! [`http`] module builds a request, validate and report pipeline on top.

pub mod data_node;
pub mod equality;
pub mod expectation;
pub mod expected;
pub mod http;
pub mod path;
pub mod traceable;
pub mod value;

pub use data_node::{DataNode, DataNodeKind};
pub use equality::{register_equal_handler, EqualComparator, EqualHandler, Mismatch};
pub use expectation::{equal, not_equal, ExpectationError};
pub use expected::{Expected, Pattern};
pub use path::{ActualPath, PathSegment};
pub use traceable::{CheckLevel, TraceableValue};
pub use value::Value;
