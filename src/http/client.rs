use std::error::Error as _;
use std::time::Instant;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::error::{ConfigError, FailureKind};

use super::request::RequestSpec;
use super::response::HttpResponse;

/// A request that never produced a complete response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect: {0}")]
    Connection(String),
    #[error("no response within {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Connection(_) => FailureKind::ConnectionError,
            TransportError::Timeout(_) => FailureKind::Timeout,
            TransportError::Other(_) => FailureKind::Other,
        }
    }
}

pub fn build_client() -> Result<Client, ConfigError> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

pub async fn send_request(
    client: &Client,
    spec: &RequestSpec,
) -> Result<HttpResponse, TransportError> {
    let mut request = client
        .request(spec.method().into(), spec.url().clone())
        .headers(spec.headers().clone())
        .timeout(spec.timeout());

    if let Some(body) = spec.body() {
        request = request.json(body);
    }

    debug!(method = %spec.method(), url = %spec.url(), "sending request");
    let started = Instant::now();
    let response = request.send().await.map_err(|e| classify(e, spec))?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| classify(e, spec))?;
    let elapsed = started.elapsed().as_millis() as u64;

    Ok(HttpResponse {
        status: status.as_u16(),
        duration_ms: elapsed,
        size_bytes: bytes.len(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn classify(err: reqwest::Error, spec: &RequestSpec) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(format!("{}ms", spec.timeout().as_millis()))
    } else if err.is_connect() {
        TransportError::Connection(error_chain(&err))
    } else {
        TransportError::Other(error_chain(&err))
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
