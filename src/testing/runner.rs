use std::time::Instant;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::http::client::send_request;

use super::{SuiteResult, TestCase, TestResult, evaluate, excerpt};

const LOGGED_BODY_CHARS: usize = 512;

/// Executes cases sequentially against live endpoints.
#[derive(Debug, Clone)]
pub struct Runner {
    client: Client,
    include_destructive: bool,
}

impl Runner {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            include_destructive: false,
        }
    }

    pub fn with_destructive(mut self, include: bool) -> Self {
        self.include_destructive = include;
        self
    }

    /// Run one case. Never fails: transport errors become failed results.
    pub async fn run_case(&self, case: &TestCase) -> TestResult {
        let started = Instant::now();
        let result = match send_request(&self.client, &case.request).await {
            Ok(response) => {
                debug!(
                    case = %case.name,
                    status = response.status,
                    size_bytes = response.size_bytes,
                    body = %excerpt(&response.body, LOGGED_BODY_CHARS),
                    "response received"
                );
                evaluate(&case.name, &response, &case.expectation)
            }
            Err(err) => TestResult::fail(
                &case.name,
                err.kind(),
                None,
                err.to_string(),
                started.elapsed().as_millis() as u64,
            ),
        };

        if result.passed {
            info!(
                case = %result.name,
                status = ?result.status_code,
                duration_ms = result.duration_ms,
                "case passed"
            );
        } else {
            warn!(
                case = %result.name,
                kind = ?result.kind,
                status = ?result.status_code,
                message = %result.message,
                "case failed"
            );
        }

        result
    }

    /// Run every case in order. A failing case never stops the suite;
    /// destructive cases are recorded as skipped unless enabled.
    pub async fn run_suite(&self, cases: &[TestCase]) -> SuiteResult {
        let mut results = Vec::with_capacity(cases.len());
        let mut skipped = Vec::new();

        for case in cases {
            if case.destructive && !self.include_destructive {
                info!(case = %case.name, "skipping destructive case");
                skipped.push(case.name.clone());
                continue;
            }
            results.push(self.run_case(case).await);
        }

        SuiteResult::new(results, skipped)
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::FailureKind;
    use crate::http::client::build_client;
    use crate::http::method::HttpMethod;
    use crate::http::request::{RequestSpec, join_url};
    use crate::testing::SuccessMarker;

    fn runner() -> Runner {
        Runner::new(build_client().unwrap())
    }

    fn get_case(name: &str, base: &str, route: &str) -> TestCase {
        let request = RequestSpec::new(HttpMethod::Get, &join_url(base, route)).unwrap();
        TestCase::new(name, request)
    }

    fn json_reply(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    async fn mount(server: &MockServer, verb: &str, route: &str, template: ResponseTemplate) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn success_marker_with_200_passes() {
        let server = MockServer::start().await;
        mount(&server, "GET", "/ok", json_reply(json!({"success": true}))).await;

        let result = runner().run_case(&get_case("ok", &server.uri(), "/ok")).await;
        assert!(result.passed);
        assert_eq!(result.status_code, Some(200));
    }

    #[tokio::test]
    async fn unreachable_host_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = runner().run_case(&get_case("down", &base, "/")).await;
        assert!(!result.passed);
        assert_eq!(result.kind, Some(FailureKind::ConnectionError));
        assert_eq!(result.status_code, None);
    }

    #[tokio::test]
    async fn receive_lesson_scenario_passes() {
        let server = MockServer::start().await;
        mount(
            &server,
            "POST",
            "/api/receive-lesson",
            json_reply(json!({"success": true, "lessonId": "x"})),
        )
        .await;

        let request = RequestSpec::post(&join_url(&server.uri(), "/api/receive-lesson"))
            .unwrap()
            .with_json(json!({
                "id": "x",
                "title": "T",
                "description": "D",
                "duration": "5 minutes",
                "difficulty": "Beginner",
                "markdownContent": "# T"
            }));
        let result = runner().run_case(&TestCase::new("receive", request)).await;
        assert!(result.passed, "{result:?}");
    }

    #[tokio::test]
    async fn server_error_without_body_fails() {
        let server = MockServer::start().await;
        mount(&server, "GET", "/boom", ResponseTemplate::new(500)).await;

        let result = runner().run_case(&get_case("boom", &server.uri(), "/boom")).await;
        assert!(!result.passed);
        assert_eq!(result.kind, Some(FailureKind::UnexpectedStatus));
        assert_eq!(result.status_code, Some(500));
    }

    #[tokio::test]
    async fn silent_server_times_out_within_bound() {
        let server = MockServer::start().await;
        mount(
            &server,
            "GET",
            "/slow",
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(10)),
        )
        .await;

        let request = RequestSpec::new(HttpMethod::Get, &join_url(&server.uri(), "/slow"))
            .unwrap()
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let result = runner().run_case(&TestCase::new("slow", request)).await;

        assert!(!result.passed);
        assert_eq!(result.kind, Some(FailureKind::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn suite_collects_every_result_in_order() {
        let server = MockServer::start().await;
        let not_found = ResponseTemplate::new(404).set_body_json(json!({"success": false}));
        mount(&server, "GET", "/a", json_reply(json!({"success": true}))).await;
        mount(&server, "GET", "/b", not_found).await;
        mount(&server, "GET", "/c", ResponseTemplate::new(200).set_body_string("not json")).await;
        mount(&server, "GET", "/d", json_reply(json!({"success": true}))).await;

        let base = server.uri();
        let cases = vec![
            get_case("a", &base, "/a"),
            get_case("b", &base, "/b"),
            get_case("c", &base, "/c"),
            get_case("d", &base, "/d"),
        ];
        let suite = runner().run_suite(&cases).await;

        let names: Vec<_> = suite.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(suite.failures().count(), 2);
        assert!(!suite.passed());
        assert_eq!(suite.results()[2].kind, Some(FailureKind::InvalidResponse));
    }

    #[tokio::test]
    async fn all_passing_suite_passes() {
        let server = MockServer::start().await;
        mount(&server, "GET", "/a", json_reply(json!({"success": true}))).await;

        let base = server.uri();
        let cases = vec![get_case("a", &base, "/a"), get_case("a again", &base, "/a")];
        let suite = runner().run_suite(&cases).await;
        assert!(suite.passed());
        assert_eq!(suite.results().len(), 2);
    }

    #[tokio::test]
    async fn read_only_case_is_repeatable() {
        let server = MockServer::start().await;
        mount(
            &server,
            "GET",
            "/api/get-upcoming-lessons",
            json_reply(json!({"success": true, "upcomingLessons": []})),
        )
        .await;

        let case = get_case("upcoming", &server.uri(), "/api/get-upcoming-lessons")
            .expect(SuccessMarker::array("upcomingLessons"));
        let runner = runner();
        let first = runner.run_case(&case).await;
        let second = runner.run_case(&case).await;
        assert_eq!(first.passed, second.passed);
        assert!(first.passed);
    }

    #[tokio::test]
    async fn result_carries_what_the_service_answered() {
        let server = MockServer::start().await;
        mount(
            &server,
            "GET",
            "/api/get-next-lesson",
            json_reply(json!({"success": true, "nextLesson": {"title": "Python Sets"}})),
        )
        .await;

        let case = get_case("next lesson", &server.uri(), "/api/get-next-lesson");
        let result = runner().run_case(&case).await;
        assert!(result.passed);
        assert_eq!(result.body.unwrap()["nextLesson"]["title"], "Python Sets");
    }

    #[tokio::test]
    async fn destructive_cases_need_opt_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reset-lessons"))
            .respond_with(json_reply(json!({"success": true, "deletedCount": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let request = RequestSpec::post(&join_url(&server.uri(), "/api/reset-lessons")).unwrap();
        let cases = vec![TestCase::new("reset lessons", request).destructive()];

        let suite = runner().run_suite(&cases).await;
        assert!(suite.results().is_empty());
        assert_eq!(suite.skipped(), ["reset lessons".to_string()]);

        let suite = runner().with_destructive(true).run_suite(&cases).await;
        assert_eq!(suite.results().len(), 1);
        assert!(suite.passed());
        assert!(suite.skipped().is_empty());
    }
}
