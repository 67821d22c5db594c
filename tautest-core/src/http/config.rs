use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{HttpError, HttpHeader};

/// Process-level HTTP settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    /// Prefix for relative request URLs.
    pub base_url: Option<String>,
    pub follow_redirects: bool,
    /// Upper bound on redirect hops per request.
    pub max_redirects: u32,
    pub user_agent: String,
    /// Responses are rendered only while `verbosity > nesting depth + 1`.
    pub verbosity: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            follow_redirects: true,
            max_redirects: 5,
            user_agent: concat!("tautest/", env!("CARGO_PKG_VERSION")).to_string(),
            verbosity: u32::MAX,
        }
    }
}

impl HttpSettings {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Hook that may rewrite a request's URL and header before it is sent.
///
/// Returning `None` from either method is a configuration error.
pub trait HttpConfiguration: Send + Sync {
    fn request_url(&self, _url: &str, full_url: &str) -> Option<String> {
        Some(full_url.to_string())
    }

    fn request_header(&self, _full_url: &str, _url: &str, header: &HttpHeader) -> Option<HttpHeader> {
        Some(header.clone())
    }
}

/// Resolves `url` against the base URL, then lets each configuration rewrite it.
pub(crate) fn full_url(
    settings: &HttpSettings,
    configurations: &[Arc<dyn HttpConfiguration>],
    url: &str,
) -> Result<String, HttpError> {
    let mut resolved = resolve_against_base(settings.base_url.as_deref(), url)?;
    for configuration in configurations {
        resolved = configuration
            .request_url(url, &resolved)
            .ok_or_else(|| HttpError::Configuration {
                message: format!("request url for {url} resolved to nothing"),
            })?;
    }
    Ok(resolved)
}

/// Applies each configuration to the caller's header, then adds the user agent.
pub(crate) fn full_header(
    settings: &HttpSettings,
    configurations: &[Arc<dyn HttpConfiguration>],
    full_url: &str,
    url: &str,
    header: &HttpHeader,
) -> Result<HttpHeader, HttpError> {
    let mut resolved = header.clone();
    for configuration in configurations {
        resolved = configuration
            .request_header(full_url, url, &resolved)
            .ok_or_else(|| HttpError::Configuration {
                message: format!("request header for {full_url} resolved to nothing"),
            })?;
    }
    if !resolved.contains("User-Agent") && !settings.user_agent.is_empty() {
        resolved.set("User-Agent", settings.user_agent.clone());
    }
    Ok(resolved)
}

fn resolve_against_base(base_url: Option<&str>, url: &str) -> Result<String, HttpError> {
    if Url::parse(url).is_ok() {
        return Ok(url.to_string());
    }
    let Some(base_url) = base_url else {
        return Err(HttpError::Configuration {
            message: format!("{url} is relative and no base url is configured"),
        });
    };
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|error| HttpError::Configuration {
        message: format!("invalid url {joined}: {error}"),
    })?;
    Ok(joined)
}
