//! Request, validate and report pipeline for a single HTTP call.
//!
//! [`Http::execute`] resolves the request, sends it through an
//! [`HttpTransport`], follows redirects, wraps the final response in header
//! and body [`DataNode`] trees and hands them to the caller's validation
//! block. Mismatches found by the block, by the default status-code policy
//! and by registered [`HttpValidationHandler`]s are recorded and combined into
//! one [`HttpError::Assertion`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::expectation::{
    equal, with_additional_handler, AssertionError, ExpectationError, ExpectationHandler, Flow,
    ValueMismatch,
};
use crate::{CheckLevel, DataNode, Value};

mod config;
mod error;
mod extract;
mod handlers;
mod report;
mod request;
mod response;
mod transport;
mod validation;

pub use config::{HttpConfiguration, HttpSettings};
pub use error::HttpError;
pub use extract::ExtractOriginal;
pub use handlers::HttpValidationHandler;
pub use report::{LogSink, RenderedResponse, ReportSink, RootStep, StepReporter};
pub use request::{HttpHeader, HttpMethod, HttpQueryParams, HttpRequest, RequestBody, RequestSpec};
pub use response::HttpResponse;
pub use transport::{HttpTransport, TransportError};
pub use validation::{
    body_node, default_expected_status_code, header_node, BodyParseError, HttpValidationResult,
    ValidationStage,
};

#[cfg(test)]
#[path = "../../tests/internal/http_pipeline_unit_tests.rs"]
mod tests;

/// Error type validation blocks and handlers may fail with.
pub type BlockError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience return type for validation blocks.
pub type ValidationOutcome<R = ()> = Result<R, BlockError>;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Last validation result of each client, as seen by the current thread.
    static LAST_RESULTS: RefCell<HashMap<u64, HttpValidationResult>> =
        RefCell::new(HashMap::new());
}

fn next_client_id() -> u64 {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// HTTP client that validates every response it receives.
///
/// The last validation result is kept per calling thread, so one client can
/// be shared between threads. Clones share settings and collaborators but
/// start without a last result of their own.
pub struct Http {
    settings: Arc<HttpSettings>,
    transport: Arc<dyn HttpTransport>,
    configurations: Vec<Arc<dyn HttpConfiguration>>,
    validation_handlers: Vec<Arc<dyn HttpValidationHandler>>,
    sink: Arc<dyn ReportSink>,
    steps: Arc<dyn StepReporter>,
    id: u64,
}

impl Clone for Http {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            transport: Arc::clone(&self.transport),
            configurations: self.configurations.clone(),
            validation_handlers: self.validation_handlers.clone(),
            sink: Arc::clone(&self.sink),
            steps: Arc::clone(&self.steps),
            id: next_client_id(),
        }
    }
}

impl Drop for Http {
    fn drop(&mut self) {
        let _ = LAST_RESULTS.try_with(|results| {
            if let Ok(mut results) = results.try_borrow_mut() {
                results.remove(&self.id);
            }
        });
    }
}

impl Http {
    pub fn new(transport: impl HttpTransport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            settings: Arc::new(HttpSettings::default()),
            transport,
            configurations: Vec::new(),
            validation_handlers: Vec::new(),
            sink: Arc::new(LogSink),
            steps: Arc::new(RootStep),
            id: next_client_id(),
        }
    }

    pub fn with_settings(mut self, settings: HttpSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn with_configuration(mut self, configuration: impl HttpConfiguration + 'static) -> Self {
        self.configurations.push(Arc::new(configuration));
        self
    }

    pub fn with_validation_handler(
        mut self,
        handler: impl HttpValidationHandler + 'static,
    ) -> Self {
        self.validation_handlers.push(Arc::new(handler));
        self
    }

    pub fn with_report_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_step_reporter(mut self, steps: impl StepReporter + 'static) -> Self {
        self.steps = Arc::new(steps);
        self
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    /// Result of the most recent call this thread made on this client,
    /// successful or not.
    ///
    /// `None` before the thread's first call and after a call that failed to
    /// resolve its URL or header.
    pub fn last_validation_result(&self) -> Option<HttpValidationResult> {
        LAST_RESULTS.with(|results| results.borrow().get(&self.id).cloned())
    }

    pub fn get<F, R, E>(&self, url: &str, validator: F) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        self.execute(RequestSpec::new(HttpMethod::Get, url), validator)
    }

    pub fn post<F, R, E>(
        &self,
        url: &str,
        body: RequestBody,
        validator: F,
    ) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        self.execute(RequestSpec::new(HttpMethod::Post, url).with_body(body), validator)
    }

    pub fn put<F, R, E>(
        &self,
        url: &str,
        body: RequestBody,
        validator: F,
    ) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        self.execute(RequestSpec::new(HttpMethod::Put, url).with_body(body), validator)
    }

    pub fn patch<F, R, E>(
        &self,
        url: &str,
        body: RequestBody,
        validator: F,
    ) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        self.execute(RequestSpec::new(HttpMethod::Patch, url).with_body(body), validator)
    }

    pub fn delete<F, R, E>(&self, url: &str, validator: F) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        self.execute(RequestSpec::new(HttpMethod::Delete, url), validator)
    }

    /// Runs one full request cycle and returns the block's unwrapped value.
    pub fn execute<F, R, E>(&self, spec: RequestSpec, validator: F) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        let mut result = match self.build(&spec) {
            Ok(result) => result,
            Err(error) => {
                log::warn!("{error}");
                self.store(None);
                return Err(error);
            }
        };

        let outcome = self.run(&mut result, validator);
        match &outcome {
            Ok(_) => result.set_stage(ValidationStage::Passed),
            Err(error) => {
                if !error.is_assertion() && result.error_message.is_none() {
                    result.error_message = Some(error.to_string());
                }
                result.set_stage(ValidationStage::Failed);
            }
        }
        self.store(Some(result));
        outcome
    }

    fn store(&self, result: Option<HttpValidationResult>) {
        LAST_RESULTS.with(|results| {
            let mut results = results.borrow_mut();
            match result {
                Some(result) => {
                    results.insert(self.id, result);
                }
                None => {
                    results.remove(&self.id);
                }
            }
        });
    }

    fn build(&self, spec: &RequestSpec) -> Result<HttpValidationResult, HttpError> {
        let url = spec.url_with_query();
        let full_url = config::full_url(&self.settings, &self.configurations, &url)?;
        let header = config::full_header(
            &self.settings,
            &self.configurations,
            &full_url,
            &url,
            &spec.header,
        )?;
        Ok(HttpValidationResult::new(
            spec.method,
            url,
            full_url,
            header,
            spec.body.clone(),
        ))
    }

    fn run<F, R, E>(
        &self,
        result: &mut HttpValidationResult,
        validator: F,
    ) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        result.set_stage(ValidationStage::Executing);
        let request = HttpRequest {
            method: result.method,
            full_url: result.full_url.clone(),
            header: result.request_header.clone(),
            body: result.request_body.clone(),
        };

        let started = Instant::now();
        let response = self.send(&request)?;
        let (response, hops) = self.follow_redirects(&request, response)?;
        result.set_elapsed(started.elapsed());
        result.redirect_hops = hops;
        log::info!(
            "executed HTTP {} {} -> {}",
            request.method,
            request.full_url,
            response.status_code
        );
        result.response = Some(response);

        let outcome = self.validate_and_record(result, validator);
        if result.body_node.is_some() {
            self.render_response(result);
            result.set_stage(ValidationStage::Reported);
        }

        let extracted = outcome?;
        if result.has_mismatches() {
            return Err(HttpError::Assertion {
                mismatches: result.mismatches.clone(),
            });
        }
        Ok(extracted)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        log::debug!("executing HTTP {} {}", request.method, request.full_url);
        self.transport
            .execute(request)
            .map_err(|source| HttpError::Transport {
                method: request.method,
                full_url: request.full_url.clone(),
                source,
            })
    }

    /// Re-issues the request against each `Location` until the response is
    /// not a redirect or the hop budget is spent.
    fn follow_redirects(
        &self,
        request: &HttpRequest,
        mut response: HttpResponse,
    ) -> Result<(HttpResponse, u32), HttpError> {
        let mut hops = 0;
        let mut current_url = request.full_url.clone();
        while response.is_redirect()
            && self.settings.follow_redirects
            && hops < self.settings.max_redirects
        {
            let Some(location) = response.location() else {
                break;
            };
            let next_url = resolve_location(&current_url, location);
            hops += 1;
            log::info!("following redirect {hops} to {next_url}");
            let hop = HttpRequest {
                full_url: next_url.clone(),
                ..request.clone()
            };
            response = self.send(&hop)?;
            current_url = next_url;
        }
        Ok((response, hops))
    }

    fn validate_and_record<F, R, E>(
        &self,
        result: &mut HttpValidationResult,
        validator: F,
    ) -> Result<R::Output, HttpError>
    where
        F: FnOnce(&DataNode, &DataNode) -> Result<R, E>,
        R: ExtractOriginal,
        E: Into<BlockError>,
    {
        let Some(response) = result.response.as_ref() else {
            return Err(self.fault(result, "no response to validate".to_string(), None));
        };
        let header = header_node(response);
        let body = body_node(response).map_err(|error| HttpError::MalformedBody {
            full_url: result.full_url.clone(),
            reason: error.reason,
            raw: error.raw,
        })?;
        result.header_node = Some(header.clone());
        result.body_node = Some(body.clone());
        result.set_stage(ValidationStage::BodyParsed);

        let recorder = MismatchRecorder::default();
        let returned = with_additional_handler(recorder.handler(Flow::Terminate), || {
            validator(&header, &body)
        });
        let extracted = match returned {
            Ok(value) => Some(value.extract_original()),
            Err(error) => {
                let error: BlockError = error.into();
                match mismatch_message(error.as_ref()) {
                    Some(message) => {
                        recorder.push(message);
                        None
                    }
                    None => {
                        let status_mismatch = validate_errors_only_status_code(result);
                        result.mismatches = recorder.messages();
                        result.mismatches.extend(status_mismatch.clone());
                        return Err(self.fault(result, error.to_string(), status_mismatch));
                    }
                }
            }
        };
        result.set_stage(ValidationStage::UserValidated);

        let status_check = with_additional_handler(recorder.handler(Flow::Terminate), || {
            validate_status_code(result)
        });
        if let Err(error) = status_check {
            result.mismatches = recorder.messages();
            return Err(self.fault(result, error.to_string(), None));
        }
        result.set_stage(ValidationStage::StatusValidated);

        for handler in &self.validation_handlers {
            let checked = with_additional_handler(recorder.handler(Flow::Terminate), || {
                handler.validate(result)
            });
            if let Err(error) = checked {
                result.mismatches = recorder.messages();
                return Err(self.fault(result, error.to_string(), None));
            }
        }

        result.mismatches = recorder.messages();
        match extracted {
            Some(value) => Ok(value),
            None => Err(HttpError::Assertion {
                mismatches: result.mismatches.clone(),
            }),
        }
    }

    fn fault(
        &self,
        result: &mut HttpValidationResult,
        message: String,
        status_mismatch: Option<String>,
    ) -> HttpError {
        log::warn!("validation of {} {} faulted: {message}", result.method, result.full_url);
        let error = HttpError::Validation {
            method: result.method,
            full_url: result.full_url.clone(),
            message,
            status_mismatch,
        };
        result.error_message = Some(error.to_string());
        error
    }

    fn render_response(&self, result: &HttpValidationResult) {
        let depth = self.steps.nesting_depth();
        if self.settings.verbosity <= depth.saturating_add(1) {
            return;
        }
        let (Some(response), Some(body)) = (&result.response, &result.body_node) else {
            return;
        };
        let rendered = if response.is_binary() {
            RenderedResponse::BinaryContent
        } else if !response.has_content() {
            RenderedResponse::NoContent
        } else {
            RenderedResponse::Body(pretty_body(body))
        };
        self.sink.render_response(&rendered);
    }
}

fn resolve_location(current_url: &str, location: &str) -> String {
    Url::parse(current_url)
        .and_then(|base| base.join(location))
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

fn pretty_body(body: &DataNode) -> String {
    match body.extract() {
        Value::String(text) => text,
        other => {
            let json = other.to_json();
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        }
    }
}

/// Message of a block error that is itself a failed assertion.
fn mismatch_message(error: &(dyn std::error::Error + Send + Sync + 'static)) -> Option<String> {
    if let Some(ExpectationError::Mismatch(assertion)) = error.downcast_ref::<ExpectationError>() {
        return Some(assertion.message.clone());
    }
    error
        .downcast_ref::<AssertionError>()
        .map(|assertion| assertion.message.clone())
}

fn status_code_node(result: &HttpValidationResult) -> Option<DataNode> {
    let status = result.header_node.as_ref()?.get("statusCode");
    (status.check_level() == Some(CheckLevel::None)).then_some(status)
}

/// Default status policy, applied only when the caller left the status unchecked.
fn validate_status_code(result: &HttpValidationResult) -> Result<(), ExpectationError> {
    let Some(status) = status_code_node(result) else {
        return Ok(());
    };
    status.should(equal(result.default_expected_status_code()))
}

/// Strict status check for the fault path: any 2xx passes.
fn validate_errors_only_status_code(result: &HttpValidationResult) -> Option<String> {
    let status = status_code_node(result)?;
    let code = result.status_code()?;
    if (200..300).contains(&code) {
        return None;
    }
    let recorder = MismatchRecorder::default();
    let checked = with_additional_handler(recorder.handler(Flow::PassToNext), || {
        status.should(equal(result.default_expected_status_code()))
    });
    match checked {
        Err(ExpectationError::Mismatch(assertion)) => Some(assertion.message),
        _ => recorder.messages().into_iter().next(),
    }
}

/// Collects mismatch messages raised while its handler is installed.
#[derive(Clone, Default)]
struct MismatchRecorder {
    messages: Rc<RefCell<Vec<String>>>,
}

impl MismatchRecorder {
    fn handler(&self, flow: Flow) -> impl ExpectationHandler + 'static {
        let messages = Rc::clone(&self.messages);
        move |mismatch: &ValueMismatch| {
            messages.borrow_mut().push(mismatch.message());
            flow
        }
    }

    fn push(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }

    fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}
