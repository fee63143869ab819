use super::provider::Transport;
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use simple_log::log::{error, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub refresh_secs: i64,
    pub low_points: i64,
    pub expire_warn_days: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            refresh_secs: 24 * 3600,
            low_points: 100,
            expire_warn_days: 7,
        }
    }
}

/// 账户剩余测评点数
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub org_name: String,
    /// -1 表示远程未给出
    pub available_points: i64,
    pub create_time: DateTime<Utc>,
    pub expire_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaWarning {
    LowBalance { points: i64, threshold: i64 },
    ExpiringSoon { days_left: i64 },
    Expired,
}

impl fmt::Display for QuotaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaWarning::LowBalance { points, threshold } => {
                write!(f, "剩余点数不足: {} < {}", points, threshold)
            }
            QuotaWarning::ExpiringSoon { days_left } => {
                write!(f, "点数将在 {} 天后过期", days_left)
            }
            QuotaWarning::Expired => write!(f, "点数已过期"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuotaBody {
    #[serde(default)]
    quotas: Vec<RawQuota>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuota {
    #[serde(default)]
    org: Option<RawOrg>,
    #[serde(default)]
    available_points: Option<i64>,
    #[serde(default)]
    create_time: Option<i64>,
    #[serde(default)]
    expire_time: Option<i64>,
}

#[derive(Deserialize)]
struct RawOrg {
    #[serde(default)]
    name: String,
}

fn timestamp(secs: Option<i64>) -> DateTime<Utc> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or_default()
}

pub fn parse_quota(body: &str, now: DateTime<Utc>) -> anyhow::Result<Quota> {
    let raw = serde_json::from_str::<RawQuotaBody>(body)?;
    let Some(first) = raw.quotas.into_iter().next() else {
        return Err(anyhow!("账户没有可用的测评额度"));
    };
    Ok(Quota {
        org_name: first.org.map(|o| o.name).unwrap_or_default(),
        available_points: first.available_points.unwrap_or(-1),
        create_time: timestamp(first.create_time),
        expire_time: timestamp(first.expire_time),
        updated_at: now,
    })
}

impl Quota {
    pub fn warnings(&self, config: &QuotaConfig, now: DateTime<Utc>) -> Vec<QuotaWarning> {
        let mut res = vec![];
        if self.available_points >= 0 && self.available_points < config.low_points {
            res.push(QuotaWarning::LowBalance {
                points: self.available_points,
                threshold: config.low_points,
            });
        }
        if self.expire_time <= now {
            res.push(QuotaWarning::Expired);
        } else {
            let days_left = (self.expire_time - now).num_days();
            if days_left < config.expire_warn_days {
                res.push(QuotaWarning::ExpiringSoon { days_left });
            }
        }
        res
    }

    pub fn summary(&self) -> String {
        format!(
            "{} 剩余点数: {}\n(点数有效期: {}-{})\n更新于: {}",
            self.org_name,
            self.available_points,
            self.create_time.format("%Y/%m/%d"),
            self.expire_time.format("%Y/%m/%d"),
            self.updated_at.format("%Y/%m/%d %H:%M:%S"),
        )
    }
}

/// 缓存账户额度, 每 `refresh_secs` 最多向远程查询一次
pub struct QuotaTracker<T: ?Sized> {
    transport: Arc<T>,
    config: QuotaConfig,
    cached: Mutex<Option<Quota>>,
}

impl<T: Transport + ?Sized> QuotaTracker<T> {
    pub fn new(transport: Arc<T>, config: QuotaConfig) -> Self {
        Self {
            transport,
            config,
            cached: Mutex::new(None),
        }
    }

    pub async fn check(&self, force: bool) -> anyhow::Result<Quota> {
        self.check_at(Utc::now(), force).await
    }

    pub async fn summary(&self) -> anyhow::Result<String> {
        Ok(self.check(false).await?.summary())
    }

    /// 每 `refresh_secs` 向远程刷新一次额度, 告警由 `check` 写进日志. 不会返回.
    pub async fn watch(&self, name: &str) {
        let period = std::time::Duration::from_secs(self.config.refresh_secs.max(60) as u64);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.check(true).await {
                error!("{} 额度查询失败: {}", name, e);
            }
        }
    }

    async fn check_at(&self, now: DateTime<Utc>, force: bool) -> anyhow::Result<Quota> {
        let mut cached = self.cached.lock().await;
        if let Some(quota) = cached.as_ref() {
            if !force && now - quota.updated_at < Duration::seconds(self.config.refresh_secs) {
                return Ok(quota.clone());
            }
        }

        let body = self.transport.fetch_quota().await?;
        let quota = parse_quota(&body, now)?;
        info!(
            "{} available: {} expire: {}",
            quota.org_name, quota.available_points, quota.expire_time
        );
        for w in quota.warnings(&self.config, now) {
            warn!("{}: {}", quota.org_name, w);
        }
        *cached = Some(quota.clone());
        Ok(quota)
    }
}
