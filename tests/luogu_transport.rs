//! LuoguTransport against a mocked open-platform API.

use std::sync::Arc;

use async_trait::async_trait;
use remote_judge::judger::luogu::LuoguTransport;
use remote_judge::judger::{
    Cancellation, PollState, ProgressSink, ProgressUpdate, RemoteJudge, RemoteJudgeConfig,
    ResultKind, SubmissionHandle, SubmissionOutcome, SubmissionRequest, SubmitError, Transport,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH: &str = "Basic b3JnOnNlY3JldA==";
const CODE: &str = "#include <cstdio>\nint main() { return 0; }";

fn config(server: &MockServer) -> RemoteJudgeConfig {
    serde_json::from_value(serde_json::json!({
        "base_url": server.uri(),
        "account": {"handle": "org", "password": "secret"},
        "poll": {"interval_ms": 10, "max_attempts": 20},
    }))
    .expect("invalid config")
}

fn judge(server: &MockServer) -> RemoteJudge<LuoguTransport> {
    let config = config(server);
    let transport = Arc::new(LuoguTransport::new(&config).expect("failed to create transport"));
    RemoteJudge::with_transport(transport, &config)
}

#[derive(Default)]
struct Collect {
    progress: Vec<ProgressUpdate>,
    terminal: Vec<SubmissionOutcome>,
}

#[async_trait]
impl ProgressSink for Collect {
    async fn on_progress(&mut self, update: ProgressUpdate) {
        self.progress.push(update);
    }

    async fn on_terminal(&mut self, outcome: SubmissionOutcome) {
        self.terminal.push(outcome);
    }
}

#[tokio::test]
async fn test_submit_sends_resolved_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/judge/problem"))
        .and(header("authorization", AUTH))
        .and(body_partial_json(serde_json::json!({
            "pid": "P1001",
            "lang": "cxx/14/gcc",
            "o2": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"requestId": "rq-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let req = SubmissionRequest::new("P1001", CODE, "luogu.cxx/14/gcco2", false, serde_json::Value::Null);
    let handle = judge(&server).client.submit(&req).await.expect("submit failed");
    assert_eq!(handle.as_str(), "rq-1");
}

#[tokio::test]
async fn test_submit_error_body_is_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/judge/problem"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"errorMessage": "Insufficient quota"})),
        )
        .mount(&server)
        .await;

    let req = SubmissionRequest::new("P1001", CODE, "luogu.2", false, serde_json::Value::Null);
    let err = judge(&server).client.submit(&req).await.unwrap_err();
    assert!(matches!(err, SubmitError::RemoteRejected(ref m) if m == "Insufficient quota"));
}

#[tokio::test]
async fn test_no_content_and_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/judge/result"))
        .and(query_param("id", "empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/judge/result"))
        .and(query_param("id", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {}}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/judge/result"))
        .and(query_param("id", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config(&server);
    let transport = LuoguTransport::new(&config).unwrap();

    let empty = transport
        .get_judge_state(&SubmissionHandle::new("empty"))
        .await
        .unwrap();
    assert!(!empty.has_content);

    let full = transport
        .get_judge_state(&SubmissionHandle::new("full"))
        .await
        .unwrap();
    assert!(full.has_content);
    assert_eq!(full.body, r#"{"data": {}}"#);

    assert!(transport
        .get_judge_state(&SubmissionHandle::new("broken"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_poll_until_finished() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/judge/result"))
        .and(query_param("id", "R1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "compile": {"success": true, "message": ""},
                "judge": {
                    "status": 2,
                    "score": 100,
                    "time": 12,
                    "memory": 800,
                    "subtasks": [
                        {"id": 0, "cases": [{"id": 1, "status": 12, "time": 12, "memory": 800}]}
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let mut sink = Collect::default();
    let state = judge(&server)
        .poller
        .poll(&SubmissionHandle::new("R1"), &mut sink, &Cancellation::new())
        .await;

    assert_eq!(state, PollState::Done);
    assert_eq!(sink.terminal.len(), 1);
    assert_eq!(sink.terminal[0].status, ResultKind::Accepted);
    assert_eq!(sink.terminal[0].score, 100);
    assert_eq!(sink.terminal[0].time_ms, 12);
    assert_eq!(sink.progress[0].progress, Some(5.0));
}

#[tokio::test]
async fn test_quota_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/judge/quotaAvailable"))
        .and(header("authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "quotas": [{
                "org": {"name": "Hydro"},
                "availablePoints": 9000,
                "createTime": 1672531200,
                "expireTime": 1704067200
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let judge = judge(&server);
    let summary = judge.quota.summary().await.expect("quota failed");
    assert!(summary.starts_with("Hydro 剩余点数: 9000"));
    // cached
    judge.quota.check(false).await.unwrap();
}
