//! Scalars that remember whether an assertion has looked at them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::Value;

/// Whether a value has been explicitly asserted on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLevel {
    /// Nothing has compared against the value yet.
    None,
    /// A comparison touched the value.
    ExplicitAssert,
}

/// Scalar wrapper that remembers whether it was checked.
///
/// The level only moves from `None` to `ExplicitAssert`.
pub struct TraceableValue {
    value: Value,
    explicitly_checked: AtomicBool,
}

impl TraceableValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            explicitly_checked: AtomicBool::new(false),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn check_level(&self) -> CheckLevel {
        if self.explicitly_checked.load(Ordering::Acquire) {
            CheckLevel::ExplicitAssert
        } else {
            CheckLevel::None
        }
    }

    pub fn mark_explicit_assert(&self) {
        self.explicitly_checked.store(true, Ordering::Release);
    }
}

impl fmt::Debug for TraceableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceableValue")
            .field("value", &self.value)
            .field("check_level", &self.check_level())
            .finish()
    }
}
