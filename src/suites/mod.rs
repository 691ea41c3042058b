//! Built-in suites for the lesson service and the flow runner.

pub mod flow;
pub mod lessons;

use crate::cli::SuiteName;
use crate::config::RunnerConfig;
use crate::error::ConfigError;
use crate::testing::TestCase;

pub fn build(name: SuiteName, config: &RunnerConfig) -> Result<Vec<TestCase>, ConfigError> {
    match name {
        SuiteName::Lessons => lessons::lesson_api_suite(config),
        SuiteName::ReceiveLesson => lessons::receive_lesson_suite(config),
        SuiteName::Flow => flow::flow_suite(config),
    }
}

/// Build all selected suites, in the order given. Fails on the first
/// misconfigured suite so nothing is sent.
pub fn build_all(
    names: &[SuiteName],
    config: &RunnerConfig,
) -> Result<Vec<TestCase>, ConfigError> {
    let mut cases = Vec::new();
    for name in names {
        cases.extend(build(*name, config)?);
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suites_are_concatenated_in_order() {
        let names = [SuiteName::ReceiveLesson, SuiteName::Lessons];
        let cases = build_all(&names, &RunnerConfig::default()).unwrap();
        assert_eq!(cases.len(), 6);
        assert_eq!(cases[0].name, "receive lesson");
        assert!(cases[0].request.url().as_str().ends_with("/api/receive-lesson"));
        assert_eq!(cases[5].name, "reset lessons");
    }

    #[test]
    fn flow_without_id_aborts_whole_build() {
        let names = [SuiteName::Lessons, SuiteName::Flow];
        let err = build_all(&names, &RunnerConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFlowId));
    }
}
