use super::provider::{CaseResult, SubtaskAggregate};
use super::ResultKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 总分的计算方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// 使用远程给出的总分, 缺失时退回子任务平均分
    #[default]
    RemoteTotal,
    /// 忽略远程总分, 按子任务平均
    SubtaskMean,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    policy: ScorePolicy,
    override_score: Option<u32>,
}

fn subtask_score(status: ResultKind) -> u32 {
    if status == ResultKind::Accepted {
        100
    } else {
        0
    }
}

impl ScoreAggregator {
    pub fn new(policy: ScorePolicy, override_score: Option<u32>) -> Self {
        Self {
            policy,
            override_score: override_score.filter(|&s| s > 0),
        }
    }

    /// Folds one case into its subtask. Returns `true` when the aggregate changed.
    ///
    /// Cases without a final verdict are left out. An existing aggregate only
    /// moves to a strictly worse status.
    pub fn fold_case(
        &self,
        aggregates: &mut BTreeMap<i64, SubtaskAggregate>,
        case: &CaseResult,
    ) -> bool {
        if !case.status.is_final() {
            return false;
        }
        match aggregates.get_mut(&case.subtask_id) {
            None => {
                aggregates.insert(
                    case.subtask_id,
                    SubtaskAggregate {
                        subtask_id: case.subtask_id,
                        status: case.status,
                        score: subtask_score(case.status),
                    },
                );
                true
            }
            Some(agg) if case.status.is_worse_than(agg.status) => {
                agg.status = case.status;
                agg.score = subtask_score(case.status);
                true
            }
            Some(_) => false,
        }
    }

    /// 从全部测试点重新计算
    pub fn rederive(&self, cases: &[CaseResult]) -> BTreeMap<i64, SubtaskAggregate> {
        let mut aggregates = BTreeMap::new();
        for case in cases {
            self.fold_case(&mut aggregates, case);
        }
        aggregates
    }

    /// Overall status and score. An empty aggregate set yields a system error,
    /// so does a set whose worst verdict is unrecognised.
    pub fn derive_outcome(
        &self,
        aggregates: &BTreeMap<i64, SubtaskAggregate>,
        remote_score: Option<u32>,
    ) -> (ResultKind, u32) {
        let Some(status) = aggregates
            .values()
            .map(|a| a.status)
            .max_by_key(|s| s.severity())
        else {
            return (ResultKind::SystemError, 0);
        };

        // 其余全部通过但有无法识别的结果
        let status = match status {
            ResultKind::Unknown => ResultKind::SystemError,
            status => status,
        };

        let mean =
            aggregates.values().map(|a| a.score).sum::<u32>() / aggregates.len() as u32;
        let score = match self.policy {
            ScorePolicy::RemoteTotal => remote_score.unwrap_or(mean),
            ScorePolicy::SubtaskMean => mean,
        };

        match (status, self.override_score) {
            (ResultKind::Accepted, Some(fixed)) => (status, fixed),
            _ => (status, score),
        }
    }
}
