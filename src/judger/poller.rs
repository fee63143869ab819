use super::payload::{decode_judge_state, JudgeState, RemoteCase};
use super::provider::{
    CaseResult, ProgressSink, ProgressUpdate, SubmissionHandle, SubmissionOutcome,
    SubtaskAggregate, Transport,
};
use super::{ResultKind, ScoreAggregator, StatusMapper};
use serde::{Deserialize, Serialize};
use simple_log::log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
    pub failure_budget: u32,
    pub initial_progress: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval_ms: 1500,
            failure_budget: 5,
            initial_progress: 5.0,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollState {
    Pending,
    Compiling,
    Judging,
    Done,
    TimedOut,
    TransportExhausted,
    /// 调用方放弃了本次轮询
    Cancelled,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollState::Done
                | PollState::TimedOut
                | PollState::TransportExhausted
                | PollState::Cancelled
        )
    }
}

/// Cooperative stop signal shared between a poll session and its owner.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// 单次轮询的状态, 不在提交之间共享
#[derive(Debug)]
pub struct PollSession {
    handle: SubmissionHandle,
    state: PollState,
    seen_cases: HashSet<(i64, i64)>,
    cases: Vec<CaseResult>,
    subtasks: BTreeMap<i64, SubtaskAggregate>,
    attempt_count: u32,
    failure_count: u32,
    malformed_count: u32,
    compiled: bool,
    compile_message: Option<String>,
    total_cases: Option<usize>,
    progress: f64,
}

impl PollSession {
    pub fn new(handle: SubmissionHandle) -> Self {
        Self {
            handle,
            state: PollState::Pending,
            seen_cases: HashSet::new(),
            cases: vec![],
            subtasks: BTreeMap::new(),
            attempt_count: 0,
            failure_count: 0,
            malformed_count: 0,
            compiled: false,
            compile_message: None,
            total_cases: None,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    pub fn subtasks(&self) -> &BTreeMap<i64, SubtaskAggregate> {
        &self.subtasks
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Applies one decoded fetch. Returns the progress events it produced and,
    /// once the remote job is over, the outcome.
    pub fn absorb(
        &mut self,
        state: JudgeState,
        mapper: &StatusMapper,
        aggregator: &ScoreAggregator,
    ) -> (Vec<ProgressUpdate>, Option<SubmissionOutcome>) {
        let mut updates = vec![];
        let JudgeState::Progress { compile, judge } = state else {
            return (updates, None);
        };
        if self.state == PollState::Pending {
            self.state = PollState::Compiling;
        }

        if let Some(compile) = compile {
            if !self.compiled {
                self.compiled = true;
                if !compile.message.is_empty() {
                    self.compile_message = Some(compile.message.clone());
                }
                updates.push(ProgressUpdate {
                    compiler_text: Some(compile.message.clone()),
                    ..Default::default()
                });
                if !compile.success {
                    self.state = PollState::Done;
                    return (updates, Some(SubmissionOutcome::compile_error(compile.message)));
                }
            }
        }

        let Some(judge) = judge else {
            return (updates, None);
        };
        self.state = PollState::Judging;

        let mapped: Vec<_> = judge
            .subtasks
            .iter()
            .flat_map(|s| s.cases.iter().map(move |c| (s.id, c)))
            .map(|(subtask_id, c)| (subtask_id, c, mapper.map(c.status.as_ref())))
            .collect();
        // 没有状态码的测试点和 Waiting/Judging 一样, 等下次再看
        let pending = |c: &RemoteCase, s: ResultKind| c.status.is_none() || s.is_in_flight();

        // 列表中还有未测完的点或测评已结束时, 列表长度即为总数
        if self.total_cases.is_none() {
            let complete = judge.finished || mapped.iter().any(|&(_, c, s)| pending(c, s));
            self.total_cases = judge
                .total_cases
                .or((complete && !mapped.is_empty()).then_some(mapped.len()));
        }

        let mut fresh = vec![];
        for (subtask_id, case, status) in mapped {
            if pending(case, status) || !self.seen_cases.insert((subtask_id, case.id)) {
                continue;
            }
            let result = CaseResult {
                case_id: case.id,
                subtask_id,
                status,
                time_ms: case.time_ms,
                memory_kb: case.memory_kb,
                message: case.message.clone(),
            };
            aggregator.fold_case(&mut self.subtasks, &result);
            self.cases.push(result.clone());
            fresh.push(result);
        }

        if !fresh.is_empty() {
            let progress = self.total_cases.map(|total| {
                let seen = self.seen_cases.len();
                let total = total.max(seen);
                self.total_cases = Some(total);
                self.progress = self.progress.max(seen as f64 * 100.0 / total as f64);
                self.progress
            });
            updates.push(ProgressUpdate {
                status: Some(ResultKind::Judging),
                progress,
                cases: fresh,
                compiler_text: None,
            });
        }

        if !judge.finished {
            return (updates, None);
        }

        let (status, score) = aggregator.derive_outcome(&self.subtasks, judge.score);
        self.state = PollState::Done;
        let outcome = SubmissionOutcome {
            status,
            score,
            time_ms: judge.time_ms,
            memory_kb: judge.memory_kb,
            subtasks: self.subtasks.clone(),
            compile_message: self.compile_message.clone(),
        };
        (updates, Some(outcome))
    }
}

pub struct ResultPoller<T: ?Sized> {
    transport: Arc<T>,
    mapper: StatusMapper,
    aggregator: ScoreAggregator,
    config: PollConfig,
}

impl<T: Transport + ?Sized> ResultPoller<T> {
    pub fn new(
        transport: Arc<T>,
        mapper: StatusMapper,
        aggregator: ScoreAggregator,
        config: PollConfig,
    ) -> Self {
        Self {
            transport,
            mapper,
            aggregator,
            config,
        }
    }

    /// Polls `handle` until the remote judge is over, reporting into `sink`.
    ///
    /// `sink` receives exactly one terminal outcome unless `cancel` fires first,
    /// in which case nothing more is reported.
    pub async fn poll<S: ProgressSink + ?Sized>(
        &self,
        handle: &SubmissionHandle,
        sink: &mut S,
        cancel: &Cancellation,
    ) -> PollState {
        let mut session = PollSession::new(handle.clone());
        sink.on_progress(ProgressUpdate {
            progress: Some(self.config.initial_progress),
            ..Default::default()
        })
        .await;

        match self.run(&mut session, sink, cancel).await {
            Some(outcome) => {
                info!(
                    "RecordID: {} done, {:?} {} {}",
                    handle, session.state, outcome.status, outcome.score
                );
                sink.on_terminal(outcome).await;
            }
            None => info!("RecordID: {} cancelled", handle),
        }
        session.state
    }

    async fn run<S: ProgressSink + ?Sized>(
        &self,
        session: &mut PollSession,
        sink: &mut S,
        cancel: &Cancellation,
    ) -> Option<SubmissionOutcome> {
        let budget = self.config.failure_budget.max(1);

        while session.attempt_count < self.config.max_attempts {
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval()) => {}
                _ = cancel.cancelled() => {}
            }
            if cancel.is_cancelled() {
                session.state = PollState::Cancelled;
                return None;
            }

            session.attempt_count += 1;
            let fetched = self.transport.get_judge_state(&session.handle).await;
            if cancel.is_cancelled() {
                session.state = PollState::Cancelled;
                return None;
            }

            let resp = match fetched {
                Ok(resp) => resp,
                Err(e) => {
                    session.failure_count += 1;
                    error!(
                        "RecordID: {} 获取测评结果失败 ({}/{}): {}",
                        session.handle, session.failure_count, budget, e
                    );
                    if session.failure_count >= budget {
                        session.state = PollState::TransportExhausted;
                        return Some(SubmissionOutcome::system_error());
                    }
                    continue;
                }
            };
            if !resp.has_content {
                continue;
            }

            let state = match decode_judge_state(&resp.body) {
                Ok(state) => state,
                Err(e) => {
                    session.malformed_count += 1;
                    warn!("RecordID: {} {}", session.handle, e);
                    if session.malformed_count >= budget {
                        session.state = PollState::TransportExhausted;
                        return Some(SubmissionOutcome::system_error());
                    }
                    continue;
                }
            };
            debug!("{}", resp.body);
            info!("Fetched with length {}", resp.body.len());

            let (updates, outcome) = session.absorb(state, &self.mapper, &self.aggregator);
            for update in updates {
                sink.on_progress(update).await;
            }
            if outcome.is_some() {
                return outcome;
            }
        }

        warn!(
            "RecordID: {} 超过最大轮询次数 {}",
            session.handle, self.config.max_attempts
        );
        session.state = PollState::TimedOut;
        Some(SubmissionOutcome::system_error())
    }
}
