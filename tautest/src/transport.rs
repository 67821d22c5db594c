use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tautest_core::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Blocking reqwest client; redirects are left to the validation pipeline.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|error| TransportError::new(format!("failed to build http client: {error}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.full_url.as_str());
        for (name, value) in request.header.iter() {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            if let Some(content_type) = request.body.content_type() {
                if !request.header.contains(CONTENT_TYPE.as_str()) {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
            }
            builder = builder.body(request.body.to_bytes());
        }

        let response = builder
            .send()
            .map_err(|error| TransportError::new(error.to_string()))?;
        let status_code = response.status().as_u16();
        let mut converted = HttpResponse::new(status_code);
        for (name, value) in response.headers() {
            if converted.header(name.as_str()).is_some() {
                continue;
            }
            converted = converted.with_header(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let content_type = converted
            .header(CONTENT_TYPE.as_str())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .map_err(|error| TransportError::new(format!("failed to read response body: {error}")))?;
        log::debug!(
            "{} {} -> {status_code} ({} bytes)",
            request.method,
            request.full_url,
            body.len()
        );
        Ok(converted.with_body(&content_type, body.to_vec()))
    }
}
