use crate::global;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper::Request;
use simple_log::log::{error, info};

use super::{task, WsRequest};

pub async fn make_ws_server() -> anyhow::Result<()> {
    let config = global::server_config()?;
    let ws_addr = format!("{}:{}", config.host, config.ws_port);

    info!("web-socket服务: {}", ws_addr);
    let router = Router::new()
        .route("/entry", get(web_socket_handler))
        .route_layer(middleware::from_fn(check_access_token));

    axum::Server::bind(&ws_addr.parse()?)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

async fn check_access_token<B>(req: Request<B>, next: Next<B>) -> Response {
    let Some(token) = global::server_config()
        .ok()
        .and_then(|c| c.access_token.as_ref())
    else {
        return next.run(req).await;
    };
    if let Some(token_header) = req.headers().get("ACCESS_TOKEN") {
        if let Ok(access_token) = token_header.to_str() {
            if access_token == token {
                return next.run(req).await;
            }
        }
    }
    serde_json::json!({"error": "没有权限"})
        .to_string()
        .into_response()
}

async fn send_error(socket: &mut WebSocket, message: String) {
    let _ = socket
        .send(Message::Text(
            serde_json::json!({ "error": message }).to_string(),
        ))
        .await;
}

async fn web_socket_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let Some(Ok(msg)) = socket.recv().await else {
            send_error(&mut socket, "获取 web-socket数据失败".into()).await;
            return;
        };

        let req = match serde_json::from_slice::<WsRequest>(msg.into_data().as_slice()) {
            Ok(req) => req,
            Err(_) => {
                send_error(&mut socket, "请求数据错误".into()).await;
                return;
            }
        };

        info!(
            "{} {} {:?} {}",
            req.remote_judge, req.request_type, req.problem_id, req.metadata
        );

        if let Err(e) = task::run(&mut socket, req).await {
            error!("{}", e);
            send_error(&mut socket, format!("{}", e)).await;
        }
    })
}
