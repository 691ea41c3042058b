//! # Smoke testing
//!
//! A case is one request plus the expectation its response must meet. The
//! runner executes cases one after another and captures every outcome,
//! including transport failures, as a [`TestResult`].

pub mod marker;
pub mod report;
pub mod runner;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FailureKind;
use crate::http::request::RequestSpec;
use crate::http::response::HttpResponse;

pub use marker::SuccessMarker;
pub use runner::Runner;

/// Accepted HTTP status codes. Written in collections as a number, an
/// inclusive `{"min": .., "max": ..}` range or the string `"any"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatus", into = "RawStatus")]
pub enum StatusExpectation {
    Exact(u16),
    Range { min: u16, max: u16 },
    Any,
}

impl Default for StatusExpectation {
    fn default() -> Self {
        StatusExpectation::Exact(200)
    }
}

impl StatusExpectation {
    pub fn matches(&self, status: u16) -> bool {
        match *self {
            StatusExpectation::Exact(expected) => status == expected,
            StatusExpectation::Range { min, max } => (min..=max).contains(&status),
            StatusExpectation::Any => true,
        }
    }

    pub fn description(&self) -> String {
        match *self {
            StatusExpectation::Exact(expected) => expected.to_string(),
            StatusExpectation::Range { min, max } => format!("{min}-{max}"),
            StatusExpectation::Any => ANY_STATUS.to_string(),
        }
    }
}

const ANY_STATUS: &str = "any";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u16),
    Range { min: u16, max: u16 },
    Keyword(String),
}

impl TryFrom<RawStatus> for StatusExpectation {
    type Error = String;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        match raw {
            RawStatus::Code(code) => Ok(StatusExpectation::Exact(code)),
            RawStatus::Range { min, max } => Ok(StatusExpectation::Range { min, max }),
            RawStatus::Keyword(word) if word.eq_ignore_ascii_case(ANY_STATUS) => {
                Ok(StatusExpectation::Any)
            }
            RawStatus::Keyword(word) => Err(format!(
                "unknown status `{word}`, expected a code, a min/max range or \"any\""
            )),
        }
    }
}

impl From<StatusExpectation> for RawStatus {
    fn from(status: StatusExpectation) -> Self {
        match status {
            StatusExpectation::Exact(code) => RawStatus::Code(code),
            StatusExpectation::Range { min, max } => RawStatus::Range { min, max },
            StatusExpectation::Any => RawStatus::Keyword(ANY_STATUS.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    pub status: StatusExpectation,
    pub marker: SuccessMarker,
}

#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub request: RequestSpec,
    pub expectation: Expectation,
    /// Mutates or deletes server state; only run when explicitly enabled.
    pub destructive: bool,
}

impl TestCase {
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            name: name.into(),
            request,
            expectation: Expectation::default(),
            destructive: false,
        }
    }

    pub fn expect_status(mut self, status: StatusExpectation) -> Self {
        self.expectation.status = status;
        self
    }

    pub fn expect(mut self, marker: SuccessMarker) -> Self {
        self.expectation.marker = marker;
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    pub message: String,
    pub duration_ms: u64,
    /// What the service answered: the parsed JSON, or an excerpt of a
    /// non-JSON body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl TestResult {
    pub fn pass(name: &str, status_code: u16, message: String, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            status_code: Some(status_code),
            kind: None,
            message,
            duration_ms,
            body: None,
        }
    }

    pub fn fail(
        name: &str,
        kind: FailureKind,
        status_code: Option<u16>,
        message: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            status_code,
            kind: Some(kind),
            message,
            duration_ms,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }
}

/// Ordered outcomes of one suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    passed: bool,
    results: Vec<TestResult>,
    skipped: Vec<String>,
}

impl SuiteResult {
    pub fn new(results: Vec<TestResult>, skipped: Vec<String>) -> Self {
        let passed = results.iter().all(|result| result.passed);
        Self {
            passed,
            results,
            skipped,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|result| !result.passed)
    }

    pub fn exit_code(&self) -> u8 {
        if self.passed { 0 } else { 1 }
    }
}

/// Longest raw body kept on a result when the response is not JSON.
pub const BODY_EXCERPT_CHARS: usize = 2048;

/// Judge a received response. Checks run in order: status, JSON body,
/// success marker. Pure; no I/O.
pub fn evaluate(name: &str, response: &HttpResponse, expectation: &Expectation) -> TestResult {
    let parsed = serde_json::from_str::<Value>(&response.body);
    let body = match &parsed {
        Ok(value) => Some(value.clone()),
        Err(_) if response.body.trim().is_empty() => None,
        Err(_) => Some(Value::String(excerpt(&response.body, BODY_EXCERPT_CHARS))),
    };

    judge(name, response, parsed, expectation).with_body(body)
}

fn judge(
    name: &str,
    response: &HttpResponse,
    parsed: Result<Value, serde_json::Error>,
    expectation: &Expectation,
) -> TestResult {
    let status = response.status;
    let duration_ms = response.duration_ms;

    if !expectation.status.matches(status) {
        let mut message = format!(
            "expected status {}, got {status}",
            expectation.status.description()
        );
        if let Some(detail) = parsed.as_ref().ok().and_then(error_detail) {
            message.push_str(&format!(" ({detail})"));
        }
        return TestResult::fail(
            name,
            FailureKind::UnexpectedStatus,
            Some(status),
            message,
            duration_ms,
        );
    }

    let body = match parsed {
        Ok(body) => body,
        Err(e) => {
            return TestResult::fail(
                name,
                FailureKind::InvalidResponse,
                Some(status),
                format!("response is not valid JSON: {e}"),
                duration_ms,
            );
        }
    };

    match expectation.marker.check(&body) {
        Ok(()) => TestResult::pass(name, status, format!("HTTP {status}"), duration_ms),
        Err(reason) => {
            let message = match error_detail(&body) {
                Some(detail) => format!("{reason} ({detail})"),
                None => reason,
            };
            TestResult::fail(
                name,
                FailureKind::AssertionFailed,
                Some(status),
                message,
                duration_ms,
            )
        }
    }
}

/// First `limit` characters of `text`, marking the cut with `...`.
pub fn excerpt(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// The service reports failures as `{"success": false, "error": "..."}`.
fn error_detail(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .map(|error| format!("error: {error}"))
}
