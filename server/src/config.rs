use pong_shared::config::PhysicsConfig;

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 10002;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Fixed seed for serve randomness; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    pub physics: PhysicsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            tick_rate_hz: 60,
            rng_seed: None,
            physics: PhysicsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PORT`, `PONG_TICK_HZ`, `PONG_RNG_SEED` and
    /// `PONG_MAX_BALL_SPEED`.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            let port: u16 = parse_var("PORT", &port)?;
            config.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(hz) = lookup("PONG_TICK_HZ") {
            config.tick_rate_hz = parse_var("PONG_TICK_HZ", &hz)?;
        }
        if let Some(seed) = lookup("PONG_RNG_SEED") {
            config.rng_seed = Some(parse_var("PONG_RNG_SEED", &seed)?);
        }
        if let Some(max) = lookup("PONG_MAX_BALL_SPEED") {
            config.physics.max_ball_speed = Some(parse_var("PONG_MAX_BALL_SPEED", &max)?);
        }

        config.validate().map_err(ServerError::InvalidConfig)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err("tick_rate_hz must be in 1..=1000".to_string());
        }
        self.physics.validate()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ServerError> {
    raw.trim()
        .parse()
        .map_err(|_| ServerError::InvalidConfig(format!("{key}={raw:?} is not a valid value")))
}
