use std::fmt::{self, Display};
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Problems in how a case or the runner was configured. These are raised
/// before any request goes out and abort the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),
    #[error("invalid header value for `{0}`")]
    InvalidHeaderValue(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
    #[error("unsupported HTTP method `{0}`")]
    UnknownMethod(String),
    #[error("invalid variable `{0}`, expected key=value")]
    InvalidVariable(String),
    #[error("the flow suite needs a flow id (--flow-id or APISMOKE_FLOW_ID)")]
    MissingFlowId,
    #[error("case `{0}` needs either `path` or `url`")]
    MissingTarget(String),
    #[error("case `{case}` expects status {min}-{max}, which no response can match")]
    EmptyStatusRange { case: String, min: u16, max: u16 },
    #[error("failed to encode request body: {0}")]
    RequestBody(#[from] serde_json::Error),
    #[error("failed to read collection `{path}`: {source}")]
    CollectionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse collection `{path}`: {source}")]
    CollectionFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a case failed. Every variant is recovered into a test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConnectionError,
    Timeout,
    InvalidResponse,
    UnexpectedStatus,
    AssertionFailed,
    Other,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::ConnectionError => "connection_error",
            FailureKind::Timeout => "timeout",
            FailureKind::InvalidResponse => "invalid_response",
            FailureKind::UnexpectedStatus => "unexpected_status",
            FailureKind::AssertionFailed => "assertion_failed",
            FailureKind::Other => "other",
        };
        write!(f, "{label}")
    }
}
