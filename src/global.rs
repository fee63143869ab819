use crate::judger::RemoteJudgeConfig;
use crate::server::ServerConfig;
use anyhow::{anyhow, Context};
use once_cell::sync::OnceCell;
use simple_log::LogConfigBuilder;
use std::collections::HashMap;
use std::path::PathBuf;

static REMOTE_JUDGE_CONFIG_MAP: OnceCell<HashMap<String, RemoteJudgeConfig>> = OnceCell::new();
static SERVER_CONFIG: OnceCell<ServerConfig> = OnceCell::new();

pub async fn init_config(
    server_path: PathBuf,
    config_path: PathBuf,
    logger_path: PathBuf,
) -> anyhow::Result<()> {
    // 初始化服务配置
    let server_config_file = tokio::fs::read(server_path.as_path())
        .await
        .with_context(|| format!("不存在 {} 文件", server_path.display()))?;

    let server_config = serde_json::from_slice::<ServerConfig>(&server_config_file)
        .context("解析服务配置文件失败")?;

    SERVER_CONFIG
        .set(server_config)
        .map_err(|_| anyhow!("服务配置已初始化"))?;

    //初始化 远程 oj 配置文件
    let rj_config_file = tokio::fs::read(config_path.as_path())
        .await
        .with_context(|| format!("不存在 {} 文件", config_path.display()))?;

    let config_map = serde_json::from_slice::<HashMap<String, RemoteJudgeConfig>>(&rj_config_file)
        .context("解析 remote-judge 配置文件失败")?;

    REMOTE_JUDGE_CONFIG_MAP
        .set(config_map)
        .map_err(|_| anyhow!("远程测评配置已初始化"))?;

    //日志配置
    let log_config = LogConfigBuilder::builder()
        .path(logger_path.to_string_lossy().as_ref())
        .level("info")
        .output_file()
        .build();
    simple_log::new(log_config).map_err(|e| anyhow!("初始化日志失败: {}", e))?;
    Ok(())
}

pub fn remote_judge_configs() -> &'static HashMap<String, RemoteJudgeConfig> {
    static EMPTY: OnceCell<HashMap<String, RemoteJudgeConfig>> = OnceCell::new();
    REMOTE_JUDGE_CONFIG_MAP
        .get()
        .unwrap_or_else(|| EMPTY.get_or_init(HashMap::new))
}

pub fn server_config() -> anyhow::Result<&'static ServerConfig> {
    SERVER_CONFIG.get().ok_or_else(|| anyhow!("服务配置未初始化"))
}

pub mod remote_judge_constant {
    pub mod names {
        pub const LUOGU: &str = "luogu";
    }
    pub mod base_url {
        pub const LUOGU: &str = "https://open-v1.lgapi.cn";
    }
}

pub mod task_constant {
    pub mod names {
        pub const JUDGE: &str = "judge";
        pub const QUOTA: &str = "quota";
    }
}
