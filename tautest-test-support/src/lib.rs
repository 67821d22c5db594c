use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ctor::ctor;

#[ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .is_test(true)
        .try_init();
}

use serde_json::Value as JsonValue;
use tautest_core::http::{
    HttpRequest, HttpResponse, HttpTransport, RenderedResponse, ReportSink, StepReporter,
    TransportError,
};

/// Transport that replays queued responses and records every request.
///
/// Clones share the queue and the request log.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.push(Err(TransportError::new(message)));
        self
    }

    pub fn push(&self, response: Result<HttpResponse, TransportError>) {
        self.responses
            .lock()
            .expect("scripted responses")
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("scripted requests").clone()
    }

    pub fn request_urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.full_url)
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("scripted requests")
            .push(request.clone());
        self.responses
            .lock()
            .expect("scripted responses")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }
}

/// Report sink that keeps every rendered response.
#[derive(Clone, Default)]
pub struct RecordingSink {
    rendered: Arc<Mutex<Vec<RenderedResponse>>>,
}

impl RecordingSink {
    pub fn rendered(&self) -> Vec<RenderedResponse> {
        self.rendered.lock().expect("rendered responses").clone()
    }
}

impl ReportSink for RecordingSink {
    fn render_response(&self, response: &RenderedResponse) {
        self.rendered
            .lock()
            .expect("rendered responses")
            .push(response.clone());
    }
}

/// Step reporter with a fixed nesting depth.
#[derive(Clone, Copy, Debug)]
pub struct FixedDepth(pub u32);

impl StepReporter for FixedDepth {
    fn nesting_depth(&self) -> u32 {
        self.0
    }
}

pub fn json_response(status_code: u16, body: JsonValue) -> HttpResponse {
    HttpResponse::json(status_code, &body)
}

pub fn redirect_response(status_code: u16, location: &str) -> HttpResponse {
    HttpResponse::new(status_code).with_header("Location", location)
}
