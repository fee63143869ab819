use super::luogu::LuoguTransport;
use super::provider::{ProgressSink, SubmissionHandle, SubmissionRequest, Transport};
use super::{
    luogu_language_table, Cancellation, LanguageResolver, PollState, QuotaTracker,
    RemoteJudgeConfig, ResultPoller, ScoreAggregator, StatusMapper, SubmissionClient,
    SubmitError,
};
use crate::global;
use anyhow::anyhow;
use once_cell::sync::OnceCell;
use simple_log::log::error;
use std::collections::HashMap;
use std::sync::Arc;

/// 一个远程测评站点: 提交, 轮询和额度查询共用同一个连接池
pub struct RemoteJudge<T: ?Sized> {
    pub client: SubmissionClient<T>,
    pub poller: ResultPoller<T>,
    pub quota: QuotaTracker<T>,
}

impl<T: Transport + ?Sized> RemoteJudge<T> {
    pub fn with_transport(transport: Arc<T>, config: &RemoteJudgeConfig) -> Self {
        let resolver = LanguageResolver::new(
            &config.lang_namespace,
            &config.optimization_suffix,
            config.lang_map.clone().unwrap_or_else(luogu_language_table),
        );
        let mapper = match &config.status_map {
            Some(table) => StatusMapper::new(table.clone()),
            None => StatusMapper::default(),
        };
        let aggregator = ScoreAggregator::new(config.score_policy, config.override_score());
        Self {
            client: SubmissionClient::new(
                transport.clone(),
                resolver,
                config.min_code_length,
                &config.submit_path,
            ),
            poller: ResultPoller::new(transport.clone(), mapper, aggregator, config.poll.clone()),
            quota: QuotaTracker::new(transport, config.quota.clone()),
        }
    }

    /// 提交并轮询直到结束. 提交失败时直接返回错误, 不会开始轮询.
    pub async fn judge<S: ProgressSink + ?Sized>(
        &self,
        req: &SubmissionRequest,
        sink: &mut S,
        cancel: &Cancellation,
    ) -> Result<(SubmissionHandle, PollState), SubmitError> {
        let handle = self.client.submit(req).await?;
        let state = self.poller.poll(&handle, sink, cancel).await;
        Ok((handle, state))
    }
}

pub fn remote_judge(name: &str) -> anyhow::Result<&'static RemoteJudge<LuoguTransport>> {
    static JUDGES: OnceCell<HashMap<String, RemoteJudge<LuoguTransport>>> = OnceCell::new();
    let judges = JUDGES.get_or_try_init(|| {
        global::remote_judge_configs()
            .iter()
            .map(|(name, config)| {
                let transport = Arc::new(LuoguTransport::new(config)?);
                Ok((name.clone(), RemoteJudge::with_transport(transport, config)))
            })
            .collect::<anyhow::Result<HashMap<_, _>>>()
    })?;
    judges
        .get(name)
        .ok_or_else(|| anyhow!("不支持 {} 测评", name))
}

/// 为每个配置的远程站点启动定时额度检查
pub fn spawn_quota_watchers() {
    for name in global::remote_judge_configs().keys() {
        let name = name.clone();
        tokio::spawn(async move {
            match remote_judge(&name) {
                Ok(judge) => judge.quota.watch(&name).await,
                Err(e) => error!("{}", e),
            }
        });
    }
}
