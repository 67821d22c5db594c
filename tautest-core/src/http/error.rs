use std::fmt;

use super::{HttpMethod, TransportError};

/// Failure of one request cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum HttpError {
    /// Connection or I/O failure; no validation took place.
    Transport {
        method: HttpMethod,
        full_url: String,
        source: TransportError,
    },
    /// One or more recorded mismatches, combined.
    Assertion { mismatches: Vec<String> },
    /// The response declared JSON but its body does not parse.
    MalformedBody {
        full_url: String,
        reason: String,
        raw: String,
    },
    /// URL or header resolution failed before anything was sent.
    Configuration { message: String },
    /// The validation block or a validation handler faulted.
    Validation {
        method: HttpMethod,
        full_url: String,
        message: String,
        /// Status-code mismatch found after the fault, if any.
        status_mismatch: Option<String>,
    },
}

impl HttpError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, HttpError::Assertion { .. })
    }
}

fn call_context(method: &HttpMethod, full_url: &str) -> String {
    format!(
        "error during http.{}({full_url})",
        method.as_str().to_ascii_lowercase()
    )
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Transport {
                method,
                full_url,
                source,
            } => write!(f, "{}: {source}", call_context(method, full_url)),
            HttpError::Assertion { mismatches } => {
                write!(f, "mismatches:\n\n{}", mismatches.join("\n\n"))
            }
            HttpError::MalformedBody {
                full_url,
                reason,
                raw,
            } => write!(f, "error parsing body from {full_url}: {reason}\n{raw}"),
            HttpError::Configuration { message } => write!(f, "configuration error: {message}"),
            HttpError::Validation {
                method,
                full_url,
                message,
                status_mismatch,
            } => {
                write!(f, "{}: {message}", call_context(method, full_url))?;
                if let Some(status) = status_mismatch {
                    write!(f, "\n\nadditional status code mismatch:\n{status}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
