use pong_shared::config::PhysicsConfig;
use pong_shared::physics::{self, StepOutcome};
use pong_shared::protocol::{InitMsg, PlayersMsg, PROTOCOL_VERSION};
use pong_shared::world::{Controls, InputFlags, Side, WorldState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::session::{ConnId, SessionRegistry};

/// Central game state owned by the game loop task.
pub struct GameState {
    pub world: WorldState,
    pub sessions: SessionRegistry,
    pub physics: PhysicsConfig,
    /// Latest held directions per seat; replaced wholesale by each input.
    controls: Controls,
    rng: ChaCha8Rng,
    next_conn_id: ConnId,
}

impl GameState {
    pub fn new(server_config: &ServerConfig) -> Self {
        let rng = match server_config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            world: WorldState::default(),
            sessions: SessionRegistry::new(),
            physics: server_config.physics,
            controls: Controls::default(),
            rng,
            next_conn_id: 1,
        }
    }

    /// Allocate an id for a new connection and try to seat it.
    /// On rejection the id is returned alongside the error for logging.
    pub fn connect(&mut self) -> Result<(ConnId, InitMsg), (ConnId, ServerError)> {
        let id = self.next_conn_id;
        self.next_conn_id = self.next_conn_id.wrapping_add(1);

        match self.sessions.assign_seat(id) {
            Ok(side) => Ok((
                id,
                InitMsg {
                    side,
                    state: self.world,
                    protocol_version: PROTOCOL_VERSION,
                },
            )),
            Err(e) => Err((id, e)),
        }
    }

    /// Release the connection's seat and drop whatever it was holding.
    /// Ball and scores are untouched.
    pub fn disconnect(&mut self, id: ConnId) -> Option<Side> {
        let side = self.sessions.release_seat(id)?;
        self.controls.set(side, Default::default());
        Some(side)
    }

    /// Replace the sender's held directions.
    pub fn input(&mut self, id: ConnId, flags: InputFlags) -> Result<Side, ServerError> {
        let side = self
            .sessions
            .seat_of(id)
            .ok_or(ServerError::UnassignedSender(id))?;
        self.controls.set(side, flags.intent_for(side));
        Ok(side)
    }

    pub fn toggle(&mut self, id: ConnId) -> Result<bool, ServerError> {
        self.require_seat(id)?;
        self.world.running = !self.world.running;
        Ok(self.world.running)
    }

    pub fn reset(&mut self, id: ConnId) -> Result<(), ServerError> {
        self.require_seat(id)?;
        physics::reset(&mut self.world, &self.physics, &mut self.rng);
        Ok(())
    }

    /// Advance one tick if running. Returns `None` while paused.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if !self.world.running {
            return None;
        }
        Some(physics::step(
            &mut self.world,
            self.controls,
            &self.physics,
            &mut self.rng,
        ))
    }

    pub fn players(&self) -> PlayersMsg {
        PlayersMsg {
            players: self.sessions.occupied(),
        }
    }

    fn require_seat(&self, id: ConnId) -> Result<Side, ServerError> {
        self.sessions
            .seat_of(id)
            .ok_or(ServerError::UnassignedSender(id))
    }
}
