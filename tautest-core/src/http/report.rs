use std::fmt;

/// Response rendering handed to the report sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedResponse {
    BinaryContent,
    NoContent,
    /// Pretty-printed body.
    Body(String),
}

impl fmt::Display for RenderedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedResponse::BinaryContent => f.write_str("[binary content]"),
            RenderedResponse::NoContent => f.write_str("[no content]"),
            RenderedResponse::Body(body) => f.write_str(body),
        }
    }
}

/// Destination for rendered responses.
pub trait ReportSink: Send + Sync {
    fn render_response(&self, response: &RenderedResponse);
}

/// Reports how deeply the current step is nested in the host's step tree.
pub trait StepReporter: Send + Sync {
    fn nesting_depth(&self) -> u32;
}

/// Writes rendered responses to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn render_response(&self, response: &RenderedResponse) {
        log::info!("response:\n{response}");
    }
}

/// Step reporter for callers without a step tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootStep;

impl StepReporter for RootStep {
    fn nesting_depth(&self) -> u32 {
        0
    }
}
