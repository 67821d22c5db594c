use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use url::Url;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// Ordered request headers with case-insensitive lookup.
///
/// The first spelling of a name is kept when it is set again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HttpHeader {
    entries: IndexMap<String, String>,
}

impl HttpHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.find_key(&name) {
            Some(existing) => {
                self.entries.insert(existing, value);
            }
            None => {
                self.entries.insert(name, value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find_key(&self, name: &str) -> Option<String> {
        self.entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    }
}

/// Query parameters appended to a request URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpQueryParams {
    params: Vec<(String, String)>,
}

impl HttpQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Encodes the parameters as `a=1&b=x%20y`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Appends the parameters to `url`, which may be relative.
    pub fn attach_to_url(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }
        if let Ok(mut parsed) = Url::parse(url) {
            parsed.query_pairs_mut().extend_pairs(self.params.iter());
            return parsed.to_string();
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{}", self.to_query_string())
    }
}

/// Payload sent with a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Text {
        content_type: String,
        content: String,
    },
    Binary {
        content_type: String,
        content: Vec<u8>,
    },
}

impl RequestBody {
    pub fn json(value: impl Into<Value>) -> Self {
        RequestBody::Json(value.into())
    }

    pub fn text(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        RequestBody::Text {
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn binary(content_type: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        RequestBody::Binary {
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Text { content_type, .. } | RequestBody::Binary { content_type, .. } => {
                Some(content_type)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, RequestBody::Binary { .. })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            RequestBody::Empty => Vec::new(),
            RequestBody::Json(value) => value.to_json().to_string().into_bytes(),
            RequestBody::Text { content, .. } => content.clone().into_bytes(),
            RequestBody::Binary { content, .. } => content.clone(),
        }
    }
}

impl Serialize for RequestBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        match self {
            RequestBody::Empty => {
                map.serialize_entry("type", "empty")?;
            }
            RequestBody::Json(value) => {
                map.serialize_entry("type", "json")?;
                map.serialize_entry("content", value)?;
            }
            RequestBody::Text {
                content_type,
                content,
            } => {
                map.serialize_entry("type", content_type)?;
                map.serialize_entry("content", content)?;
            }
            RequestBody::Binary {
                content_type,
                content,
            } => {
                map.serialize_entry("type", content_type)?;
                map.serialize_entry("size", &content.len())?;
            }
        }
        map.end()
    }
}

/// Fully resolved request handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub full_url: String,
    pub header: HttpHeader,
    pub body: RequestBody,
}

/// Request as the caller describes it, before configuration is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub header: HttpHeader,
    pub query: HttpQueryParams,
    pub body: RequestBody,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            header: HttpHeader::new(),
            query: HttpQueryParams::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, header: HttpHeader) -> Self {
        self.header = header;
        self
    }

    pub fn with_query(mut self, query: HttpQueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// URL with the query parameters attached.
    pub fn url_with_query(&self) -> String {
        self.query.attach_to_url(&self.url)
    }
}
