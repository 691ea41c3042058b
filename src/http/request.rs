use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::ConfigError;

use super::method::HttpMethod;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully validated HTTP request. Built once through the `with_*` methods
/// and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: Option<Value>,
    timeout: Duration,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn post(url: &str) -> Result<Self, ConfigError> {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_headers(mut self, headers: &HashMap<String, String>) -> Result<Self, ConfigError> {
        self.headers.extend(build_headers(headers)?);
        Ok(self)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Append `path` to `base`, tolerating a trailing slash on the base and a
/// missing leading slash on the path.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

pub fn build_headers(input: &HashMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }
        let (name, value) = parse_header(key, value)?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))?;
    let header_value = HeaderValue::from_str(value.trim())
        .map_err(|_| ConfigError::InvalidHeaderValue(name.to_string()))?;
    Ok((header_name, header_value))
}
