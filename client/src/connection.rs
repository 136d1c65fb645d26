use std::sync::mpsc::{self, Receiver, Sender};

use pong_shared::protocol::{ClientMsg, ServerMsg, PROTOCOL_VERSION};
use pong_shared::world::InputFlags;

#[derive(Debug, Clone)]
pub enum NetEvent {
    Connected,
    Message(ServerMsg),
    /// The socket could not be opened at all.
    Failed(String),
    Disconnected,
    ProtocolMismatch { server: u32, client: u32 },
}

type CmdSender = tokio::sync::mpsc::UnboundedSender<ClientMsg>;

/// One WebSocket session with the server, driven from a background thread.
///
/// There is no automatic reconnect: once [`NetEvent::Failed`] or
/// [`NetEvent::Disconnected`] has been delivered the connection is spent.
/// Dropping the value closes the socket.
pub struct ServerConnection {
    event_rx: Receiver<NetEvent>,
    cmd_tx: CmdSender,
}

impl ServerConnection {
    pub fn connect(url: String) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let cmd_tx = spawn_network_thread(url, event_tx);
        Self { event_rx, cmd_tx }
    }

    /// In-memory stand-in for a socket: events pushed into the returned sender
    /// are polled by the connection, and commands it sends come out of the
    /// returned receiver.
    pub fn loopback() -> (
        Self,
        Sender<NetEvent>,
        tokio::sync::mpsc::UnboundedReceiver<ClientMsg>,
    ) {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel::<ClientMsg>();
        (Self { event_rx, cmd_tx }, event_tx, cmd_rx)
    }

    pub fn poll_events(&self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        while let Ok(evt) = self.event_rx.try_recv() {
            out.push(evt);
        }
        out
    }

    pub fn send_input(&self, flags: InputFlags) {
        self.send(ClientMsg::Input(flags));
    }

    pub fn send_toggle(&self) {
        self.send(ClientMsg::Toggle);
    }

    pub fn send_reset(&self) {
        self.send(ClientMsg::Reset);
    }

    fn send(&self, msg: ClientMsg) {
        // Fails only after the network thread has exited, which it reports itself.
        let _ = self.cmd_tx.send(msg);
    }
}

fn spawn_network_thread(url: String, event_tx: Sender<NetEvent>) -> CmdSender {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<ClientMsg>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                let _ = event_tx.send(NetEvent::Failed(format!("runtime: {e}")));
                return;
            }
        };

        rt.block_on(async move {
            let (ws_stream, _) = match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok(x) => x,
                Err(e) => {
                    tracing::warn!("Failed to connect to {}: {}", url, e);
                    let _ = event_tx.send(NetEvent::Failed(e.to_string()));
                    return;
                }
            };

            tracing::info!("Connected to {}", url);
            let _ = event_tx.send(NetEvent::Connected);

            let (mut write, mut read) = ws_stream.split();

            loop {
                tokio::select! {
                    biased;

                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else {
                            // Owner dropped the connection.
                            let _ = write.close().await;
                            return;
                        };
                        match serde_json::to_string(&cmd) {
                            Ok(text) => {
                                if write.send(Message::Text(text.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::error!("Failed to serialize client message: {}", e),
                        }
                    }

                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(txt))) => {
                                match serde_json::from_str::<ServerMsg>(&txt) {
                                    Ok(server_msg) => {
                                        if let ServerMsg::Init(init) = &server_msg {
                                            if init.protocol_version != PROTOCOL_VERSION {
                                                let _ = event_tx.send(NetEvent::ProtocolMismatch {
                                                    server: init.protocol_version,
                                                    client: PROTOCOL_VERSION,
                                                });
                                                let _ = write.close().await;
                                                return;
                                            }
                                        }
                                        let _ = event_tx.send(NetEvent::Message(server_msg));
                                    }
                                    Err(e) => tracing::debug!("Ignoring unreadable server message: {}", e),
                                }
                            }
                            Some(Ok(Message::Close(_))) => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::debug!("WebSocket error: {}", e);
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            let _ = event_tx.send(NetEvent::Disconnected);
        });
    });

    cmd_tx
}
