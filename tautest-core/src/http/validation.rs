use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use super::{HttpHeader, HttpMethod, HttpResponse, RequestBody};
use crate::{ActualPath, DataNode, Value};

/// Pipeline position of one request cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Built,
    Executing,
    BodyParsed,
    UserValidated,
    StatusValidated,
    Reported,
    Passed,
    Failed,
}

/// Everything recorded about one initial request and its redirect hops.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpValidationResult {
    pub method: HttpMethod,
    /// URL as the caller passed it.
    pub url: String,
    pub full_url: String,
    pub request_header: HttpHeader,
    pub request_body: RequestBody,
    pub response: Option<HttpResponse>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: Option<u64>,
    pub redirect_hops: u32,
    pub stage: ValidationStage,
    pub header_node: Option<DataNode>,
    pub body_node: Option<DataNode>,
    pub mismatches: Vec<String>,
    pub error_message: Option<String>,
}

impl HttpValidationResult {
    pub fn new(
        method: HttpMethod,
        url: String,
        full_url: String,
        request_header: HttpHeader,
        request_body: RequestBody,
    ) -> Self {
        Self {
            method,
            url,
            full_url,
            request_header,
            request_body,
            response: None,
            started_at: Utc::now(),
            elapsed_ms: None,
            redirect_hops: 0,
            stage: ValidationStage::Built,
            header_node: None,
            body_node: None,
            mismatches: Vec::new(),
            error_message: None,
        }
    }

    pub(crate) fn set_stage(&mut self, stage: ValidationStage) {
        log::debug!(
            "http {} {}: {:?} -> {:?}",
            self.method,
            self.full_url,
            self.stage,
            stage
        );
        self.stage = stage;
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_ms.map(Duration::from_millis)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|response| response.status_code)
    }

    pub fn has_response_content(&self) -> bool {
        self.response
            .as_ref()
            .is_some_and(HttpResponse::has_content)
    }

    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }

    pub fn render_mismatches(&self) -> String {
        self.mismatches.join("\n\n")
    }

    /// Status the response should carry when the caller did not assert one.
    pub fn default_expected_status_code(&self) -> u16 {
        default_expected_status_code(self.method, self.has_response_content())
    }
}

pub fn default_expected_status_code(method: HttpMethod, has_content: bool) -> u16 {
    match method {
        HttpMethod::Get => 200,
        HttpMethod::Post => 201,
        HttpMethod::Put | HttpMethod::Delete if has_content => 200,
        HttpMethod::Put | HttpMethod::Delete => 204,
        _ => 200,
    }
}

/// Header tree: `statusCode`, `statusLine`, then every response header.
pub fn header_node(response: &HttpResponse) -> DataNode {
    let mut entries = IndexMap::new();
    entries.insert("statusCode".to_string(), Value::from(response.status_code));
    entries.insert("statusLine".to_string(), Value::from(response.status_line()));
    for (name, value) in &response.headers {
        entries
            .entry(name.clone())
            .or_insert_with(|| Value::from(value.as_str()));
    }
    DataNode::from_value(ActualPath::new("header"), Value::Map(entries))
}

/// Declared-JSON body that failed to parse.
#[derive(Debug)]
pub struct BodyParseError {
    pub reason: String,
    pub raw: String,
}

/// Body tree built according to the response's content classification.
pub fn body_node(response: &HttpResponse) -> Result<DataNode, BodyParseError> {
    let path = ActualPath::new("body");
    if !response.is_binary() && !response.has_content() {
        return Ok(DataNode::scalar(path, Value::Null));
    }
    if response.is_json() {
        let parsed: serde_json::Value =
            serde_json::from_slice(&response.body).map_err(|error| BodyParseError {
                reason: error.to_string(),
                raw: response.text_content(),
            })?;
        return Ok(DataNode::from_value(path, Value::from(parsed)));
    }
    if response.is_text() {
        return Ok(DataNode::scalar(path, response.text_content()));
    }
    Ok(DataNode::scalar(path, Value::bytes(response.body.clone())))
}
