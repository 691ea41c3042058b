use serde::Serialize;
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::error::ConfigError;
use crate::http::request::{RequestSpec, join_url};
use crate::testing::{SuccessMarker, TestCase};

#[derive(Debug, Clone, Serialize)]
struct RunFlowPayload<'a> {
    output_type: &'a str,
    input_type: &'a str,
    input_value: &'a str,
    session_id: String,
}

/// One chat-style run of a flow. Only checks that the service answers 200
/// with JSON; the content is model output and not stable.
pub fn flow_suite(config: &RunnerConfig) -> Result<Vec<TestCase>, ConfigError> {
    let flow_id = config.flow.flow_id.as_deref().ok_or(ConfigError::MissingFlowId)?;
    let payload = RunFlowPayload {
        output_type: "chat",
        input_type: "chat",
        input_value: &config.flow.input_value,
        session_id: Uuid::new_v4().to_string(),
    };

    let url = join_url(&config.flow.base_url, &format!("/api/v1/run/{flow_id}"));
    let spec = RequestSpec::post(&url)?
        .with_header("accept", "application/json")?
        .with_header("content-type", "application/json")?
        .with_json(serde_json::to_value(&payload)?)
        .with_timeout(config.timeout);
    let spec = config.auth.apply(spec)?;

    Ok(vec![TestCase::new("run flow", spec).expect(SuccessMarker::Json)])
}
