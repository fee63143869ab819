use super::WsRequest;
use crate::global::task_constant::names as task_names;
use crate::judger::{
    remote_judge, Cancellation, PollState, ProgressSink, ProgressUpdate, SubmissionOutcome,
    SubmissionRequest,
};
use anyhow::anyhow;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use simple_log::log::{info, warn};
use std::future::Future;
use tokio::sync::mpsc;

/// 发往客户端的一端, 客户端断开后 `recv_message` 返回 `None`
#[async_trait]
trait ClientSocket: Send {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()>;

    async fn recv_message(&mut self) -> Option<Message>;
}

#[async_trait]
impl ClientSocket for WebSocket {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv_message(&mut self) -> Option<Message> {
        match self.recv().await {
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => None,
            Some(Ok(msg)) => Some(msg),
        }
    }
}

/// 把测评进度交给 `relay` 写回 web-socket
struct WsSink {
    tx: mpsc::UnboundedSender<String>,
}

impl WsSink {
    fn send(&self, value: serde_json::Value) {
        // relay 已经退出时丢弃
        let _ = self.tx.send(value.to_string());
    }
}

#[async_trait]
impl ProgressSink for WsSink {
    async fn on_progress(&mut self, update: ProgressUpdate) {
        self.send(serde_json::json!({ "progress": update }))
    }

    async fn on_terminal(&mut self, outcome: SubmissionOutcome) {
        self.send(serde_json::json!({ "result": outcome }))
    }
}

/// 轮询期间转发进度, 同时监听客户端; 发送失败或客户端断开都会取消轮询
async fn relay<C, F>(
    socket: &mut C,
    mut rx: mpsc::UnboundedReceiver<String>,
    poll: F,
    cancel: &Cancellation,
) -> PollState
where
    C: ClientSocket,
    F: Future<Output = PollState>,
{
    tokio::pin!(poll);
    let mut client_gone = false;

    let state = loop {
        tokio::select! {
            state = &mut poll => break state,
            Some(text) = rx.recv(), if !client_gone => {
                if let Err(e) = socket.send_text(text).await {
                    warn!("web-socket 发送失败, 停止轮询: {}", e);
                    client_gone = true;
                    cancel.cancel();
                }
            }
            msg = socket.recv_message(), if !client_gone => {
                if msg.is_none() {
                    info!("客户端已断开, 停止轮询");
                    client_gone = true;
                    cancel.cancel();
                }
            }
        }
    };

    if !client_gone {
        while let Ok(text) = rx.try_recv() {
            if let Err(e) = socket.send_text(text).await {
                warn!("web-socket 发送失败: {}", e);
                break;
            }
        }
    }
    state
}

async fn judge_task(ws: &mut WebSocket, req: WsRequest) -> anyhow::Result<()> {
    let (Some(problem_id), Some(source), Some(lang)) = (req.problem_id, req.source, req.lang)
    else {
        return Err(anyhow!("请求参数错误"));
    };
    let judge = remote_judge(&req.remote_judge)?;
    let request = SubmissionRequest::new(problem_id, source, lang, req.o2, req.metadata);

    let handle = judge.client.submit(&request).await?;
    ws.send_text(serde_json::json!({ "submission_id": handle }).to_string())
        .await?;

    let cancel = Cancellation::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut sink = WsSink { tx };
    let poll = judge.poller.poll(&handle, &mut sink, &cancel);
    relay(ws, rx, poll, &cancel).await;
    Ok(())
}

async fn quota_task(ws: &mut WebSocket, req: WsRequest) -> anyhow::Result<()> {
    let judge = remote_judge(&req.remote_judge)?;
    let quota = judge.quota.check(false).await?;
    ws.send_text(serde_json::json!({ "quota": quota, "summary": quota.summary() }).to_string())
        .await?;
    Ok(())
}

pub async fn run(ws: &mut WebSocket, req: WsRequest) -> anyhow::Result<()> {
    match req.request_type.as_str() {
        task_names::JUDGE => judge_task(ws, req).await,
        task_names::QUOTA => quota_task(ws, req).await,
        _ => Err(anyhow!("任务类型错误")),
    }
}
