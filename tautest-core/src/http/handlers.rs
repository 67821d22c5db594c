use super::{BlockError, HttpValidationResult};

/// Check that runs after the status-code policy on every request cycle.
///
/// Runs inside the same record-only scope as the caller's block, so
/// assertions made through data nodes are recorded rather than raised.
pub trait HttpValidationHandler: Send + Sync {
    fn validate(&self, result: &HttpValidationResult) -> Result<(), BlockError>;
}

impl<F> HttpValidationHandler for F
where
    F: Fn(&HttpValidationResult) -> Result<(), BlockError> + Send + Sync,
{
    fn validate(&self, result: &HttpValidationResult) -> Result<(), BlockError> {
        self(result)
    }
}
