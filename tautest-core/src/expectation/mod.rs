//! Assertions over actual values, routed through the per-thread handler stack.

use std::fmt;

use crate::equality::{render_mismatches, Actual, ComparatorError, Mismatch};
use crate::ActualPath;

mod handlers;
mod matchers;

pub use handlers::{with_additional_handler, ExpectationHandler, Flow};
pub use matchers::{equal, not_equal, EqualMatcher, NotEqualMatcher, ValueMatcher};

#[cfg(test)]
#[path = "../../tests/internal/expectation_unit_tests.rs"]
mod tests;

/// Failed assertion, carrying the combined path-qualified message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssertionError {
    pub message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AssertionError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExpectationError {
    /// The actual value did not satisfy the matcher and no handler absorbed it.
    Mismatch(AssertionError),
    /// The comparison itself could not be carried out.
    Comparator(ComparatorError),
}

impl ExpectationError {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ExpectationError::Mismatch(_))
    }
}

impl fmt::Display for ExpectationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationError::Mismatch(error) => write!(f, "{error}"),
            ExpectationError::Comparator(error) => write!(f, "comparison failed: {error}"),
        }
    }
}

impl std::error::Error for ExpectationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExpectationError::Mismatch(error) => Some(error),
            ExpectationError::Comparator(error) => Some(error),
        }
    }
}

impl From<ComparatorError> for ExpectationError {
    fn from(error: ComparatorError) -> Self {
        ExpectationError::Comparator(error)
    }
}

/// What expectation handlers receive when an assertion fails.
#[derive(Clone, Debug)]
pub struct ValueMismatch {
    pub path: ActualPath,
    /// Rendered actual value.
    pub actual: String,
    /// Matcher description, e.g. `equal 200 <number>`.
    pub expectation: String,
    pub mismatches: Vec<Mismatch>,
}

impl ValueMismatch {
    /// Combined path-qualified description of every mismatch.
    pub fn message(&self) -> String {
        if self.mismatches.is_empty() {
            return format!("{}: expected to {}", self.path, self.expectation);
        }
        render_mismatches(&self.mismatches)
    }
}

/// Asserts `actual` against `matcher`.
///
/// On a mismatch the installed handlers are consulted innermost first; the
/// call fails unless one of them terminates the chain.
pub fn should<M>(path: &ActualPath, actual: Actual<'_>, matcher: &M) -> Result<(), ExpectationError>
where
    M: ValueMatcher + ?Sized,
{
    let mismatches = matcher.matches(path, actual)?;
    settle(path, actual, matcher.matching_message(), mismatches)
}

/// Negated form of [`should`].
pub fn should_not<M>(
    path: &ActualPath,
    actual: Actual<'_>,
    matcher: &M,
) -> Result<(), ExpectationError>
where
    M: ValueMatcher + ?Sized,
{
    let mismatches = matcher.negative_matches(path, actual)?;
    settle(path, actual, matcher.negative_matching_message(), mismatches)
}

fn settle(
    path: &ActualPath,
    actual: Actual<'_>,
    expectation: String,
    mismatches: Vec<Mismatch>,
) -> Result<(), ExpectationError> {
    if mismatches.is_empty() {
        log::debug!("{path} matched: {expectation}");
        return Ok(());
    }
    let mismatch = ValueMismatch {
        path: path.clone(),
        actual: actual.render(),
        expectation,
        mismatches,
    };
    handlers::on_value_mismatch(&mismatch)
}

/// Wraps any actual value so it can be asserted on directly.
///
/// ```
/// use tautest_core::expectation::{actual, equal};
/// use tautest_core::Value;
///
/// let price = Value::from(10);
/// actual(&price).with_path("price").should(equal(10)).unwrap();
/// ```
pub fn actual<'a>(value: impl Into<Actual<'a>>) -> ActualValue<'a> {
    ActualValue {
        path: ActualPath::new("value"),
        actual: value.into(),
    }
}

pub struct ActualValue<'a> {
    path: ActualPath,
    actual: Actual<'a>,
}

impl<'a> ActualValue<'a> {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = ActualPath::new(path);
        self
    }

    pub fn should<M: ValueMatcher>(&self, matcher: M) -> Result<(), ExpectationError> {
        should(&self.path, self.actual, &matcher)
    }

    pub fn should_not<M: ValueMatcher>(&self, matcher: M) -> Result<(), ExpectationError> {
        should_not(&self.path, self.actual, &matcher)
    }
}
