//! # Collections
//!
//! User-defined cases stored as JSON:
//!
//! ```json
//! {
//!   "name": "quiz api",
//!   "variables": { "lesson_id": "python-dictionaries" },
//!   "cases": [
//!     { "name": "get lesson", "method": "POST", "path": "/api/get-lesson",
//!       "body": { "lessonId": "{{lesson_id}}" },
//!       "marker": { "all": [{ "flag": "success" }, { "present": "/lesson/content" }] } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ACTIVE_ENVIRONMENT, RunnerConfig};
use crate::environment::{EnvironmentManager, interpolate};
use crate::error::ConfigError;
use crate::http::method::HttpMethod;
use crate::http::request::{RequestSpec, join_url};
use crate::testing::{StatusExpectation, SuccessMarker, TestCase};

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    #[serde(default)]
    pub cases: Vec<SavedCase>,
}

/// One case as written in a collection file. `path` is appended to the
/// configured base URL; `url` is used verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedCase {
    pub name: String,
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    pub path: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    #[serde(default)]
    pub status: StatusExpectation,
    #[serde(default)]
    pub marker: SuccessMarker,
    #[serde(default)]
    pub destructive: bool,
    pub timeout_ms: Option<u64>,
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

pub fn load_collection(path: &Path) -> Result<Collection, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::CollectionIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_collection(&raw).map_err(|source| ConfigError::CollectionFormat {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_collection(raw: &str) -> Result<Collection, serde_json::Error> {
    serde_json::from_str(raw)
}

impl Collection {
    /// Resolve placeholders and validate every request up front.
    pub fn into_cases(self, config: &RunnerConfig) -> Result<Vec<TestCase>, ConfigError> {
        let manager = EnvironmentManager {
            globals: config.globals.clone(),
            environments: vec![config.environment()],
            active_environment: Some(ACTIVE_ENVIRONMENT.to_string()),
        };
        let variables = manager.resolve(&self.variables);
        debug!(collection = %self.name, cases = self.cases.len(), "resolving collection");

        self.cases
            .into_iter()
            .map(|case| case.into_test_case(config, &variables))
            .collect()
    }
}

impl SavedCase {
    fn into_test_case(
        self,
        config: &RunnerConfig,
        variables: &HashMap<String, String>,
    ) -> Result<TestCase, ConfigError> {
        if let StatusExpectation::Range { min, max } = self.status {
            if min > max {
                return Err(ConfigError::EmptyStatusRange {
                    case: self.name,
                    min,
                    max,
                });
            }
        }

        let url = match (&self.url, &self.path) {
            (Some(url), _) => interpolate(url, variables),
            (None, Some(path)) => join_url(&config.base_url, &interpolate(path, variables)),
            (None, None) => return Err(ConfigError::MissingTarget(self.name)),
        };

        let headers: HashMap<String, String> = self
            .headers
            .iter()
            .map(|(k, v)| (interpolate(k, variables), interpolate(v, variables)))
            .collect();

        let timeout = self.timeout_ms.map(Duration::from_millis).unwrap_or(config.timeout);
        let mut spec = config
            .auth
            .apply(RequestSpec::new(self.method, &url)?)?
            .with_headers(&headers)?
            .with_timeout(timeout);
        if let Some(body) = self.body {
            spec = spec.with_json(interpolate_value(body, variables));
        }

        let mut case = TestCase::new(self.name, spec)
            .expect_status(self.status)
            .expect(self.marker);
        if self.destructive {
            case = case.destructive();
        }
        Ok(case)
    }
}

fn interpolate_value(value: Value, variables: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(&s, variables)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| interpolate_value(item, variables))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, interpolate_value(v, variables)))
                .collect(),
        ),
        other => other,
    }
}
