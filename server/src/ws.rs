use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pong_shared::protocol::{ClientMsg, ServerMsg};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::game_loop::{GameBroadcast, GameCommand, JoinReply};
use crate::session::ConnId;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Connect { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let (my_id, init, mut broadcast_rx) = match resp_rx.await {
        Ok(JoinReply::Seated { id, init, updates }) => (id, init, updates),
        Ok(JoinReply::Full) => {
            let _ = send_msg(&mut sink, &ServerMsg::Full).await;
            let _ = sink.close().await;
            return;
        }
        Err(_) => {
            tracing::error!("Failed to receive seat assignment");
            return;
        }
    };

    if send_msg(&mut sink, &ServerMsg::Init(init)).await.is_ok() {
        pump(my_id, &mut sink, &mut stream, &mut broadcast_rx, &app_state).await;
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::Disconnect { id: my_id })
        .await;
}

/// Relay client messages to the game loop and broadcasts to the client until
/// either side goes away.
async fn pump(
    my_id: ConnId,
    sink: &mut SplitSink<WebSocket, Message>,
    stream: &mut SplitStream<WebSocket>,
    broadcast_rx: &mut broadcast::Receiver<GameBroadcast>,
    app_state: &AppState,
) {
    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let cmd = match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(ClientMsg::Input(flags)) => GameCommand::Input { id: my_id, flags },
                            Ok(ClientMsg::Toggle) => GameCommand::Toggle { id: my_id },
                            Ok(ClientMsg::Reset) => GameCommand::Reset { id: my_id },
                            Err(e) => {
                                tracing::debug!("Ignoring malformed message from {}: {}", my_id, e);
                                continue;
                            }
                        };
                        if app_state.game_tx.send(cmd).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Connection {} read error: {}", my_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(broadcast) => {
                        let msg = match broadcast {
                            GameBroadcast::State(world) => ServerMsg::State(world),
                            GameBroadcast::Players(players) => ServerMsg::Players(players),
                        };
                        if send_msg(sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Connection {} lagged by {} messages", my_id, n);
                        // Continue - every state supersedes the last, dropping is fine
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Serialize and send one message. Serialization failures are logged and
/// swallowed; only a dead socket is an error.
async fn send_msg(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}
