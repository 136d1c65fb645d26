//! The client's view of the game and who is authoritative over it.
//!
//! In local mode the agent owns the world and steps it with the shared physics,
//! both paddles driven from one keyboard. In networked mode the server owns
//! the world: the agent forwards held keys and replaces its copy with every
//! snapshot it receives, without prediction or smoothing.

use pong_shared::config::PhysicsConfig;
use pong_shared::physics;
use pong_shared::protocol::ServerMsg;
use pong_shared::world::{Controls, InputFlags, Side, WorldState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::connection::{NetEvent, ServerConnection};

/// Something the user should be told about. Every notice below also means the
/// agent has dropped back to local mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNotice {
    RoomFull,
    ConnectFailed(String),
    Disconnected,
    ProtocolMismatch { server: u32, client: u32 },
}

impl std::fmt::Display for ClientNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomFull => write!(f, "Room is full, playing locally"),
            Self::ConnectFailed(e) => write!(f, "Could not connect ({e}), playing locally"),
            Self::Disconnected => write!(f, "Lost connection to server, playing locally"),
            Self::ProtocolMismatch { server, client } => write!(
                f,
                "Server speaks protocol {server}, this client {client}; playing locally"
            ),
        }
    }
}

struct Networked {
    conn: ServerConnection,
    side: Option<Side>,
    players: Vec<Side>,
    /// Last snapshot we sent, to notice key releases.
    last_sent: InputFlags,
}

enum Mode {
    Local,
    Networked(Networked),
}

pub struct ClientSyncAgent {
    world: WorldState,
    physics: PhysicsConfig,
    rng: ChaCha8Rng,
    mode: Mode,
}

impl Default for ClientSyncAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSyncAgent {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Local agent with reproducible serves.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            world: WorldState::default(),
            physics: PhysicsConfig::default(),
            rng,
            mode: Mode::Local,
        }
    }

    /// What the renderer should draw.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn is_networked(&self) -> bool {
        matches!(self.mode, Mode::Networked(_))
    }

    /// Seat assigned by the server, once `init` has arrived.
    pub fn side(&self) -> Option<Side> {
        match &self.mode {
            Mode::Networked(net) => net.side,
            Mode::Local => None,
        }
    }

    /// Occupied seats as last reported by the server.
    pub fn players(&self) -> &[Side] {
        match &self.mode {
            Mode::Networked(net) => &net.players,
            Mode::Local => &[],
        }
    }

    /// Switch to networked mode against `url`. Ignored when already networked;
    /// call [`disconnect`](Self::disconnect) first.
    pub fn connect(&mut self, url: &str) {
        if self.is_networked() {
            tracing::warn!("Already connected; disconnect before connecting again");
            return;
        }
        self.attach(ServerConnection::connect(url.to_string()));
    }

    /// Switch to networked mode over an existing connection.
    pub fn attach(&mut self, conn: ServerConnection) {
        if self.is_networked() {
            return;
        }
        self.fresh_world();
        self.mode = Mode::Networked(Networked {
            conn,
            side: None,
            players: Vec::new(),
            last_sent: InputFlags::default(),
        });
    }

    /// Close any connection and return to a fresh local game.
    pub fn disconnect(&mut self) {
        self.mode = Mode::Local;
        self.fresh_world();
    }

    /// Drive one animation frame with the keys currently held.
    pub fn frame(&mut self, keys: InputFlags) -> Vec<ClientNotice> {
        if self.is_networked() {
            return self.frame_networked(keys);
        }
        self.step_local(keys);
        Vec::new()
    }

    /// Start or pause play. In networked mode the server decides.
    pub fn toggle(&mut self) {
        match &self.mode {
            Mode::Local => self.world.running = !self.world.running,
            Mode::Networked(net) => net.conn.send_toggle(),
        }
    }

    pub fn reset(&mut self) {
        match &self.mode {
            Mode::Local => physics::reset(&mut self.world, &self.physics, &mut self.rng),
            Mode::Networked(net) => net.conn.send_reset(),
        }
    }

    fn step_local(&mut self, keys: InputFlags) {
        if !self.world.running {
            return;
        }
        let outcome = physics::step(
            &mut self.world,
            Controls::from_keyboard(keys),
            &self.physics,
            &mut self.rng,
        );
        if outcome.scored.is_some() {
            // Local play waits for the players after each point.
            self.world.running = false;
        }
    }

    fn frame_networked(&mut self, keys: InputFlags) -> Vec<ClientNotice> {
        let Mode::Networked(net) = &mut self.mode else {
            return Vec::new();
        };

        let mut notices = Vec::new();
        for event in net.conn.poll_events() {
            match event {
                NetEvent::Connected => {}
                NetEvent::Message(ServerMsg::Init(init)) => {
                    tracing::info!("Seated on the {} side", init.side);
                    net.side = Some(init.side);
                    self.world = init.state;
                }
                NetEvent::Message(ServerMsg::State(world)) => self.world = world,
                NetEvent::Message(ServerMsg::Players(players)) => net.players = players.players,
                NetEvent::Message(ServerMsg::Full) => notices.push(ClientNotice::RoomFull),
                NetEvent::Failed(e) => notices.push(ClientNotice::ConnectFailed(e)),
                NetEvent::Disconnected => notices.push(ClientNotice::Disconnected),
                NetEvent::ProtocolMismatch { server, client } => {
                    notices.push(ClientNotice::ProtocolMismatch { server, client })
                }
            }
        }

        if !notices.is_empty() {
            // Later events on a dead connection add nothing.
            notices.truncate(1);
            tracing::warn!("{}", notices[0]);
            self.disconnect();
            return notices;
        }

        // Send while anything is held, plus once on release.
        if net.side.is_some() && (keys.any() || net.last_sent.any()) {
            net.conn.send_input(keys);
            net.last_sent = keys;
        }

        notices
    }

    fn fresh_world(&mut self) {
        self.world = WorldState::default();
    }
}
