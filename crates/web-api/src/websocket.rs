//! 实时通道处理器
//!
//! 升级后的连接拆分为两半：写任务把中枢投递的信封逐条写入
//! socket；当前任务作为每连接读取循环，解码入站帧并走先持久化、
//! 后广播的文本路径。无法识别的帧静默忽略。读取循环退出时恰好
//! 注销一次，这是正常退出路径而非错误路径。

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use application::{Connection, ConnectionId};
use domain::{ClientEvent, Envelope, Identity};

use crate::auth::AuthenticatedUser;
use crate::state::AppState;

/// 每连接出站队列容量
///
/// 中枢在广播时 await 入队：队列满的慢连接会停滞整个控制循环，
/// 这是文档化的默认行为。
const OUTBOUND_QUEUE: usize = 32;

pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::channel::<Envelope>(OUTBOUND_QUEUE);

    let connection_id = ConnectionId::new();
    state.hub.register(Connection {
        id: connection_id,
        identity: identity.clone(),
        outbound,
    });
    info!(connection_id = %connection_id, user_id = %identity.user_id, "websocket connection established");

    // 写任务：连接被中枢移除后发送端随之释放，recv 返回 None，任务退出
    let write_task = tokio::spawn(async move {
        while let Some(envelope) = outbound_rx.recv().await {
            if sender
                .send(WsMessage::Text(envelope.as_str().into()))
                .await
                .is_err()
            {
                break;
            }
        }
        debug!("websocket write task finished");
    });

    // 读取循环：传输关闭或出错即结束
    while let Some(incoming) = receiver.next().await {
        let message = match incoming {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "websocket read failed");
                break;
            }
        };

        match message {
            WsMessage::Text(text) => {
                let Some(ClientEvent::NewText { content }) = ClientEvent::decode(&text) else {
                    // 宽容忽略：不产生事件，也不向对端报错
                    continue;
                };
                if let Err(err) = state.chat_service.post_text(&identity, content).await {
                    // 文本路径的持久化失败只记录日志，不补偿通知发送方
                    error!(error = %err, user_id = %identity.user_id, "failed to persist text event, not broadcast");
                }
            }
            WsMessage::Close(_) => break,
            // Ping/Pong 由 axum 自动应答，Binary 不在协议内
            _ => {}
        }
    }

    // 正常退出路径：恰好触发一次注销，中枢释放传输
    state.hub.unregister(connection_id);
    let _ = write_task.await;
    info!(connection_id = %connection_id, user_id = %identity.user_id, "websocket connection closed");
}
