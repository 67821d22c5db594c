use crate::equality::{Actual, ComparatorError, EqualComparator, Mismatch};
use crate::{ActualPath, Expected};

/// A predicate over actual values with human-readable descriptions.
///
/// `matches` and `negative_matches` return the mismatches found; an empty
/// list means the (negated) expectation holds.
pub trait ValueMatcher {
    fn matching_message(&self) -> String;
    fn negative_matching_message(&self) -> String;
    fn matches(&self, path: &ActualPath, actual: Actual<'_>)
        -> Result<Vec<Mismatch>, ComparatorError>;
    fn negative_matches(
        &self,
        path: &ActualPath,
        actual: Actual<'_>,
    ) -> Result<Vec<Mismatch>, ComparatorError>;
}

pub fn equal(expected: impl Into<Expected>) -> EqualMatcher {
    EqualMatcher {
        expected: expected.into(),
    }
}

pub fn not_equal(expected: impl Into<Expected>) -> NotEqualMatcher {
    NotEqualMatcher {
        inner: equal(expected),
    }
}

#[derive(Clone, Debug)]
pub struct EqualMatcher {
    expected: Expected,
}

impl EqualMatcher {
    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    fn compare(&self, path: &ActualPath, actual: Actual<'_>) -> Result<Vec<Mismatch>, ComparatorError> {
        let mut comparator = EqualComparator::new();
        comparator.compare(path, actual, &self.expected)?;
        Ok(comparator.into_mismatches())
    }
}

impl ValueMatcher for EqualMatcher {
    fn matching_message(&self) -> String {
        format!("equal {}", self.expected.describe())
    }

    fn negative_matching_message(&self) -> String {
        format!("not equal {}", self.expected.describe())
    }

    fn matches(&self, path: &ActualPath, actual: Actual<'_>) -> Result<Vec<Mismatch>, ComparatorError> {
        self.compare(path, actual)
    }

    fn negative_matches(
        &self,
        path: &ActualPath,
        actual: Actual<'_>,
    ) -> Result<Vec<Mismatch>, ComparatorError> {
        if !self.compare(path, actual)?.is_empty() {
            return Ok(Vec::new());
        }
        let rendered = actual.render();
        Ok(vec![Mismatch {
            path: path.clone(),
            message: format!(
                "  actual: {rendered}\nexpected: not {}",
                self.expected.describe()
            ),
            actual: rendered,
        }])
    }
}

#[derive(Clone, Debug)]
pub struct NotEqualMatcher {
    inner: EqualMatcher,
}

impl ValueMatcher for NotEqualMatcher {
    fn matching_message(&self) -> String {
        self.inner.negative_matching_message()
    }

    fn negative_matching_message(&self) -> String {
        self.inner.matching_message()
    }

    fn matches(&self, path: &ActualPath, actual: Actual<'_>) -> Result<Vec<Mismatch>, ComparatorError> {
        self.inner.negative_matches(path, actual)
    }

    fn negative_matches(
        &self,
        path: &ActualPath,
        actual: Actual<'_>,
    ) -> Result<Vec<Mismatch>, ComparatorError> {
        self.inner.matches(path, actual)
    }
}
