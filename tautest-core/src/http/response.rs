use indexmap::IndexMap;
use serde::Serialize;

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Response as returned by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    /// Empty when the server did not send one.
    pub content_type: String,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn json(status_code: u16, body: &serde_json::Value) -> Self {
        Self::new(status_code).with_body("application/json", body.to_string())
    }

    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(status_code).with_body("text/plain", body.into())
    }

    pub fn binary(status_code: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status_code).with_body(content_type, body)
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = content_type.to_string();
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn media_type(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn is_json(&self) -> bool {
        let media = self.media_type();
        media == "application/json" || media.ends_with("+json")
    }

    /// Textual but not JSON. A missing content type counts as text.
    pub fn is_text(&self) -> bool {
        let media = self.media_type();
        media.starts_with("text/")
            || media == "application/xml"
            || media.ends_with("+xml")
            || media == "application/javascript"
            || media == "application/x-www-form-urlencoded"
    }

    pub fn is_binary(&self) -> bool {
        !self.is_json() && !self.is_text()
    }

    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUSES.contains(&self.status_code) && self.location().is_some()
    }

    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }

    pub fn has_content(&self) -> bool {
        !self.body.is_empty()
    }

    pub fn text_content(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `HTTP/1.1 404 Not Found` style status line.
    pub fn status_line(&self) -> String {
        let reason = http::StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default();
        format!("HTTP/1.1 {} {reason}", self.status_code)
            .trim_end()
            .to_string()
    }
}
