use serde::Serialize;

use crate::config::RunnerConfig;
use crate::error::ConfigError;
use crate::http::method::HttpMethod;
use crate::http::request::{RequestSpec, join_url};
use crate::testing::{SuccessMarker, TestCase};

pub const RECEIVE_LESSON: &str = "/api/receive-lesson";
pub const NEXT_LESSON: &str = "/api/get-next-lesson";
pub const UPCOMING_LESSONS: &str = "/api/get-upcoming-lessons";
pub const COMPLETED_LESSONS: &str = "/api/get-completed-lessons";
pub const RESET_LESSONS: &str = "/api/reset-lessons";

/// Payload accepted by the receive-lesson endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub duration: &'static str,
    pub difficulty: &'static str,
    pub markdown_content: &'static str,
}

pub const DICTIONARIES: Lesson = Lesson {
    id: "python-dictionaries",
    title: "Python Dictionaries",
    description: "Learn how to work with dictionaries in Python, including creation, manipulation, and common operations.",
    duration: "18 minutes",
    difficulty: "Beginner",
    markdown_content: include_str!("fixtures/python-dictionaries.md"),
};

pub const LIST_COMPREHENSIONS: Lesson = Lesson {
    id: "python-list-comprehensions",
    title: "Python List Comprehensions",
    description: "Learn how to create lists efficiently using Python list comprehensions.",
    duration: "20 minutes",
    difficulty: "Intermediate",
    markdown_content: include_str!("fixtures/python-list-comprehensions.md"),
};

/// Upload a lesson, read back the lesson queues and optionally wipe
/// everything.
pub fn lesson_api_suite(config: &RunnerConfig) -> Result<Vec<TestCase>, ConfigError> {
    let both = |list: &str| {
        SuccessMarker::All(vec![SuccessMarker::flag("success"), SuccessMarker::array(list)])
    };

    Ok(vec![
        TestCase::new("receive lesson", send_lesson(config, &DICTIONARIES)?),
        TestCase::new("next lesson", request(config, HttpMethod::Get, NEXT_LESSON)?).expect(
            SuccessMarker::All(vec![
                SuccessMarker::flag("success"),
                SuccessMarker::present("nextLesson"),
            ]),
        ),
        TestCase::new("upcoming lessons", request(config, HttpMethod::Get, UPCOMING_LESSONS)?)
            .expect(both("upcomingLessons")),
        TestCase::new("completed lessons", request(config, HttpMethod::Get, COMPLETED_LESSONS)?)
            .expect(both("completedLessons")),
        TestCase::new("reset lessons", request(config, HttpMethod::Post, RESET_LESSONS)?)
            .expect(SuccessMarker::All(vec![
                SuccessMarker::flag("success"),
                SuccessMarker::present("deletedCount"),
            ]))
            .destructive(),
    ])
}

/// Push a single lesson and check the service echoes its id.
pub fn receive_lesson_suite(config: &RunnerConfig) -> Result<Vec<TestCase>, ConfigError> {
    let case = TestCase::new("receive lesson", send_lesson(config, &LIST_COMPREHENSIONS)?).expect(
        SuccessMarker::All(vec![
            SuccessMarker::flag("success"),
            SuccessMarker::present("lessonId"),
        ]),
    );
    Ok(vec![case])
}

fn send_lesson(config: &RunnerConfig, lesson: &Lesson) -> Result<RequestSpec, ConfigError> {
    let body = serde_json::to_value(lesson)?;
    Ok(request(config, HttpMethod::Post, RECEIVE_LESSON)?.with_json(body))
}

fn request(
    config: &RunnerConfig,
    method: HttpMethod,
    path: &str,
) -> Result<RequestSpec, ConfigError> {
    let spec = RequestSpec::new(method, &join_url(&config.base_url, path))?
        .with_header("content-type", "application/json")?
        .with_timeout(config.timeout);
    config.auth.apply(spec)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::client::build_client;
    use crate::testing::Runner;

    fn config_for(base_url: &str) -> RunnerConfig {
        RunnerConfig {
            base_url: base_url.to_string(),
            ..RunnerConfig::default()
        }
    }

    async fn mount_get(server: &MockServer, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn lesson_payload_uses_camel_case() {
        let payload = serde_json::to_value(&DICTIONARIES).unwrap();
        let content = payload["markdownContent"].as_str().unwrap();
        assert_eq!(payload["id"], "python-dictionaries");
        assert!(content.starts_with("# Python Dictionaries"));
        assert!(payload.get("markdown_content").is_none());
    }

    #[test]
    fn reset_is_the_only_destructive_case() {
        let cases = lesson_api_suite(&RunnerConfig::default()).unwrap();
        let destructive: Vec<_> = cases
            .iter()
            .filter(|c| c.destructive)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(cases.len(), 5);
        assert_eq!(destructive, ["reset lessons"]);
    }

    #[test]
    fn requests_carry_configured_timeout() {
        let config = RunnerConfig {
            timeout: std::time::Duration::from_secs(3),
            ..RunnerConfig::default()
        };
        for case in lesson_api_suite(&config).unwrap() {
            assert_eq!(case.request.timeout(), config.timeout);
        }
    }

    #[tokio::test]
    async fn full_suite_passes_against_healthy_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RECEIVE_LESSON))
            .and(body_partial_json(json!({"id": "python-dictionaries", "difficulty": "Beginner"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "lessonId": "python-dictionaries"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_get(&server, NEXT_LESSON, json!({"success": true, "nextLesson": null})).await;
        mount_get(&server, UPCOMING_LESSONS, json!({"success": true, "upcomingLessons": []})).await;
        mount_get(
            &server,
            COMPLETED_LESSONS,
            json!({"success": true, "completedLessons": [{"id": "a", "title": "A"}]}),
        )
        .await;
        Mock::given(method("POST"))
            .and(path(RESET_LESSONS))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "deletedCount": 4})),
            )
            .expect(0)
            .mount(&server)
            .await;

        let cases = lesson_api_suite(&config_for(&server.uri())).unwrap();
        let suite = Runner::new(build_client().unwrap()).run_suite(&cases).await;

        assert!(suite.passed(), "{:?}", suite.results());
        assert_eq!(suite.results().len(), 4);
        assert_eq!(suite.skipped(), ["reset lessons".to_string()]);
    }

    #[tokio::test]
    async fn missing_queue_field_fails_only_that_case() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RECEIVE_LESSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;
        mount_get(&server, NEXT_LESSON, json!({"success": true, "nextLesson": {"id": "a"}})).await;
        mount_get(&server, UPCOMING_LESSONS, json!({"success": true})).await;
        let completed = json!({"success": true, "completedLessons": []});
        mount_get(&server, COMPLETED_LESSONS, completed).await;

        let cases = lesson_api_suite(&config_for(&server.uri())).unwrap();
        let suite = Runner::new(build_client().unwrap()).run_suite(&cases).await;

        let failed: Vec<_> = suite.failures().map(|r| r.name.as_str()).collect();
        assert_eq!(failed, ["upcoming lessons"]);
        assert_eq!(suite.results().len(), 4);
    }

    #[tokio::test]
    async fn receive_lesson_requires_lesson_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RECEIVE_LESSON))
            .and(body_partial_json(json!({"id": "python-list-comprehensions"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let cases = receive_lesson_suite(&config_for(&server.uri())).unwrap();
        let suite = Runner::new(build_client().unwrap()).run_suite(&cases).await;

        assert!(!suite.passed());
        assert_eq!(suite.results()[0].message, "`lessonId` is missing");
    }
}
