//! Scripted collaborators for unit tests.

use super::provider::{
    FetchResponse, ProgressSink, ProgressUpdate, SubmissionHandle, SubmissionOutcome,
    SubmitResponse, Transport,
};
use super::{Cancellation, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 按顺序返回预设结果, 用完之后判题接口一直返回无内容
#[derive(Default)]
pub struct ScriptedTransport {
    submits: Mutex<VecDeque<Result<String, TransportError>>>,
    fetches: Mutex<VecDeque<Result<FetchResponse, TransportError>>>,
    quotas: Mutex<VecDeque<Result<String, TransportError>>>,
    submitted: Mutex<Vec<(String, serde_json::Value)>>,
    calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    quota_calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn push_submit(&self, resp: Result<String, TransportError>) {
        self.submits.lock().unwrap().push_back(resp);
    }

    pub fn push_fetch(&self, resp: Result<FetchResponse, TransportError>) {
        self.fetches.lock().unwrap().push_back(resp);
    }

    pub fn push_body(&self, body: &str) {
        self.push_fetch(Ok(FetchResponse::content(body)));
    }

    pub fn push_no_content(&self) {
        self.push_fetch(Ok(FetchResponse::no_content()));
    }

    pub fn push_quota(&self, resp: Result<String, TransportError>) {
        self.quotas.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn quota_calls(&self) -> usize {
        self.quota_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<(String, serde_json::Value)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_submit(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<SubmitResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap()
            .push((path.to_string(), payload.clone()));
        let body = self
            .submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted submit".into())))?;
        Ok(SubmitResponse { status: 200, body })
    }

    async fn get_judge_state(
        &self,
        _handle: &SubmissionHandle,
    ) -> Result<FetchResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FetchResponse::no_content()))
    }

    async fn fetch_quota(&self) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quota_calls.fetch_add(1, Ordering::SeqCst);
        self.quotas
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted quota".into())))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub progress: Vec<ProgressUpdate>,
    pub terminals: Vec<SubmissionOutcome>,
    events: Vec<&'static str>,
    cancel_on_cases: Option<Cancellation>,
}

impl RecordingSink {
    pub fn cancelling_on_cases(cancel: Cancellation) -> Self {
        Self {
            cancel_on_cases: Some(cancel),
            ..Default::default()
        }
    }

    /// (subtask, case) in the order they were first reported.
    pub fn case_keys(&self) -> Vec<(i64, i64)> {
        self.progress
            .iter()
            .flat_map(|u| u.cases.iter().map(|c| (c.subtask_id, c.case_id)))
            .collect()
    }

    pub fn terminal_is_last(&self) -> bool {
        self.events.iter().filter(|&&e| e == "terminal").count() == 1
            && self.events.last() == Some(&"terminal")
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn on_progress(&mut self, update: ProgressUpdate) {
        if !update.cases.is_empty() {
            if let Some(cancel) = &self.cancel_on_cases {
                cancel.cancel();
            }
        }
        self.events.push("progress");
        self.progress.push(update);
    }

    async fn on_terminal(&mut self, outcome: SubmissionOutcome) {
        self.events.push("terminal");
        self.terminals.push(outcome);
    }
}

/// 构造一次判题结果, `cases` 为 (测试点 id, 远程状态码)
pub fn judge_body(finished: bool, score: Option<u32>, subtasks: &[(i64, &[(i64, i64)])]) -> String {
    let subtasks: Vec<_> = subtasks
        .iter()
        .map(|(id, cases)| {
            let cases: Vec<_> = cases
                .iter()
                .map(|(case_id, status)| {
                    serde_json::json!({
                        "id": case_id,
                        "status": status,
                        "time": 10,
                        "memory": 1024,
                        "description": "",
                    })
                })
                .collect();
            serde_json::json!({ "id": id, "cases": cases })
        })
        .collect();
    let mut judge = serde_json::json!({
        "status": if finished { 2 } else { 1 },
        "time": 30,
        "memory": 2048,
        "subtasks": subtasks,
    });
    if let Some(score) = score {
        judge["score"] = score.into();
    }
    serde_json::json!({ "data": { "judge": judge } }).to_string()
}
