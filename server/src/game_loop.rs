use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::session::ConnId;
use crate::state::GameState;
use pong_shared::physics::StepOutcome;
use pong_shared::protocol::{InitMsg, PlayersMsg};
use pong_shared::world::{InputFlags, WorldState};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
#[derive(Debug)]
pub enum GameCommand {
    Connect {
        response: oneshot::Sender<JoinReply>,
    },
    Input {
        id: ConnId,
        flags: InputFlags,
    },
    Toggle {
        id: ConnId,
    },
    Reset {
        id: ConnId,
    },
    Disconnect {
        id: ConnId,
    },
}

/// Answer to [`GameCommand::Connect`].
#[derive(Debug)]
pub enum JoinReply {
    /// `updates` is subscribed when `init` is taken, so its first `State` is
    /// never older than `init.state`.
    Seated {
        id: ConnId,
        init: InitMsg,
        updates: broadcast::Receiver<GameBroadcast>,
    },
    Full,
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    State(WorldState),
    Players(PlayersMsg),
}

/// Run the main game loop. Owns all game state.
///
/// Ticks at a fixed rate whether or not play is running, and sends the world
/// to every subscriber on every tick. Ends once every command sender is gone.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut state = GameState::new(&server_config);

    let tick_duration = Duration::from_secs_f64(1.0 / server_config.tick_rate_hz as f64);
    let diagnostics_every_n = u64::from(server_config.tick_rate_hz);
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                // Everything that arrived before this tick lands before the step.
                while let Ok(cmd) = cmd_rx.try_recv() {
                    handle_command(&mut state, &broadcast_tx, cmd);
                }

                if let Some(outcome) = state.tick() {
                    log_outcome(&state, outcome);
                }
                let _ = broadcast_tx.send(GameBroadcast::State(state.world));

                tick_count += 1;
                if tick_count % diagnostics_every_n == 0 {
                    log_diagnostics(&state);
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => handle_command(&mut state, &broadcast_tx, cmd),
                    None => break,
                }
            }
        }
    }

    tracing::info!("Game loop ended");
}

fn handle_command(
    state: &mut GameState,
    broadcast_tx: &broadcast::Sender<GameBroadcast>,
    cmd: GameCommand,
) {
    match cmd {
        GameCommand::Connect { response } => match state.connect() {
            Ok((id, init)) => {
                let side = init.side;
                let updates = broadcast_tx.subscribe();
                if response
                    .send(JoinReply::Seated { id, init, updates })
                    .is_err()
                {
                    // Socket went away before it could be told its seat.
                    state.disconnect(id);
                    return;
                }
                tracing::info!("Connection {} seated {}", id, side);
                let _ = broadcast_tx.send(GameBroadcast::Players(state.players()));
            }
            Err((id, e)) => {
                tracing::info!("Connection {} rejected: {}", id, e);
                let _ = response.send(JoinReply::Full);
            }
        },
        GameCommand::Input { id, flags } => {
            if let Err(e) = state.input(id, flags) {
                tracing::trace!("Dropped input: {}", e);
            }
        }
        GameCommand::Toggle { id } => match state.toggle(id) {
            Ok(running) => tracing::debug!("Connection {} toggled running={}", id, running),
            Err(e) => tracing::trace!("Dropped toggle: {}", e),
        },
        GameCommand::Reset { id } => match state.reset(id) {
            Ok(()) => tracing::debug!("Connection {} reset the game", id),
            Err(e) => tracing::trace!("Dropped reset: {}", e),
        },
        GameCommand::Disconnect { id } => {
            if let Some(side) = state.disconnect(id) {
                tracing::info!("{}; {} seat free", ServerError::TransportDisconnect(id), side);
                let _ = broadcast_tx.send(GameBroadcast::Players(state.players()));
            }
        }
    }
}

fn log_outcome(state: &GameState, outcome: StepOutcome) {
    if outcome.wall_bounce {
        tracing::trace!("wall bounce at x {:.0}", state.world.ball.x);
    }
    if let Some(side) = outcome.paddle_hit {
        tracing::debug!(
            "{} paddle hit, ball speed {:.2}",
            side,
            state.world.ball.speed()
        );
    }
    if let Some(side) = outcome.scored {
        tracing::info!(
            "{} scores ({} - {})",
            side,
            state.world.left.score,
            state.world.right.score
        );
    }
}

fn log_diagnostics(state: &GameState) {
    let world = &state.world;
    if world.running {
        tracing::debug!(
            "ball pos {:.0} {:.0} vx {:.2} vy {:.2}",
            world.ball.x,
            world.ball.y,
            world.ball.vx,
            world.ball.vy
        );
    }
    tracing::debug!(
        "paddles left.y={:.0} right.y={:.0}",
        world.left.y,
        world.right.y
    );
}
