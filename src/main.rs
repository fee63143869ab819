use remote_judge::{global, judger, server};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let (server_path, config_path, logger_path) = if args.len() >= 4 {
        (
            PathBuf::from(&args[1]),
            PathBuf::from(&args[2]),
            PathBuf::from(&args[3]),
        )
    } else {
        (
            PathBuf::from("server.json"),
            PathBuf::from("remote_judge_config.json"),
            PathBuf::from("remote_judge.log"),
        )
    };

    global::init_config(server_path, config_path, logger_path).await?;
    judger::spawn_quota_watchers();
    server::make_ws_server().await
}
