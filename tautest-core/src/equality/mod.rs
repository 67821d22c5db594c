//! Structural equality engine with a priority-ordered handler table.
//!
//! [`EqualComparator::compare`] walks the table and hands the comparison to
//! the first handler whose predicate accepts the `(actual, expected)` pair.
//! Handlers may call back into the comparator to unwrap indirections or to
//! recurse into containers. Extension handlers are consulted before the
//! always-present defaults, in registration order.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{ActualPath, Expected};

mod actual;
mod handlers;

pub use actual::{Actual, ElementValue, LiveValue};
pub(crate) use actual::{MapView, Shape};

#[cfg(test)]
#[path = "../../tests/internal/equality_unit_tests.rs"]
mod tests;

/// One comparison strategy in the handler table.
pub trait EqualHandler: Send + Sync {
    /// Returns true when this handler knows how to compare the pair.
    fn handles(&self, actual: &Actual<'_>, expected: &Expected) -> bool;

    /// Compares the pair, reporting mismatches through `comparator.report`.
    fn compare(
        &self,
        comparator: &mut EqualComparator,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError>;
}

type HandlerTable = Vec<Arc<dyn EqualHandler>>;

static EXTENSION_HANDLERS: Lazy<ArcSwap<HandlerTable>> =
    Lazy::new(|| ArcSwap::from_pointee(handlers::builtin_extensions()));

static DEFAULT_HANDLERS: Lazy<HandlerTable> = Lazy::new(handlers::default_handlers);

/// Appends a handler to the process-wide extension table.
///
/// Registered handlers run after previously registered ones and before the
/// defaults. Intended for setup time; comparisons already in flight keep the
/// table they started with.
pub fn register_equal_handler(handler: Arc<dyn EqualHandler>) {
    EXTENSION_HANDLERS.rcu(|current| {
        let mut next: HandlerTable = current.iter().cloned().collect();
        next.push(handler.clone());
        next
    });
    log::debug!(
        "registered equal handler; {} extension handlers active",
        EXTENSION_HANDLERS.load().len()
    );
}

/// A single path-qualified inequality.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Mismatch {
    pub path: ActualPath,
    /// Rendered actual value.
    pub actual: String,
    /// Description of the difference; may span several lines.
    pub message: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("{}: ", self.path);
        let indent = " ".repeat(prefix.chars().count());
        for (index, line) in self.message.lines().enumerate() {
            if index == 0 {
                write!(f, "{prefix}{line}")?;
            } else {
                write!(f, "\n{indent}{line}")?;
            }
        }
        Ok(())
    }
}

/// Fault raised when no handler can interpret a pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ComparatorError {
    Unsupported {
        path: ActualPath,
        actual: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for ComparatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorError::Unsupported {
                path,
                actual,
                expected,
            } => write!(
                f,
                "no equal handler can compare {actual} with {expected} at {path}"
            ),
        }
    }
}

impl std::error::Error for ComparatorError {}

/// Collects mismatches while comparing one actual value against one expectation.
pub struct EqualComparator {
    extensions: Arc<HandlerTable>,
    mismatches: Vec<Mismatch>,
}

impl EqualComparator {
    /// Comparator over the current process-wide handler table.
    pub fn new() -> Self {
        Self::with_extensions(EXTENSION_HANDLERS.load_full())
    }

    /// Comparator over an explicit extension table; defaults still apply.
    pub fn with_extensions(extensions: Arc<Vec<Arc<dyn EqualHandler>>>) -> Self {
        Self {
            extensions,
            mismatches: Vec::new(),
        }
    }

    pub fn compare(
        &mut self,
        path: &ActualPath,
        actual: Actual<'_>,
        expected: &Expected,
    ) -> Result<(), ComparatorError> {
        let Some(handler) = self.find_handler(&actual, expected) else {
            return Err(ComparatorError::Unsupported {
                path: path.clone(),
                actual: actual.kind_name(),
                expected: expected.kind_name(),
            });
        };
        handler.compare(self, path, actual, expected)
    }

    fn find_handler(&self, actual: &Actual<'_>, expected: &Expected) -> Option<Arc<dyn EqualHandler>> {
        self.extensions
            .iter()
            .chain(DEFAULT_HANDLERS.iter())
            .find(|handler| handler.handles(actual, expected))
            .cloned()
    }

    /// Records a mismatch. This is the only way differences are reported.
    pub fn report(&mut self, path: &ActualPath, actual: impl Into<String>, message: impl Into<String>) {
        let mismatch = Mismatch {
            path: path.clone(),
            actual: actual.into(),
            message: message.into(),
        };
        log::debug!("mismatch at {}", mismatch.path);
        self.mismatches.push(mismatch);
    }

    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn into_mismatches(self) -> Vec<Mismatch> {
        self.mismatches
    }
}

impl Default for EqualComparator {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins mismatches into one block, one path-qualified entry per mismatch.
pub fn render_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
