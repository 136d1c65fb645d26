//! Headless pong client.
//!
//! Usage: pong-client [URL | --local]
//!
//! Runs the sync agent at 60 frames per second with an autopilot on the keys
//! and logs the score whenever it changes. Defaults to
//! `ws://127.0.0.1:10002/ws`, or `PONG_WS_URL` when set.

use std::time::Duration;

use pong_client::autopilot::autopilot;
use pong_client::sync::ClientSyncAgent;
use pong_shared::world::{InputFlags, Side};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_micros(16_667);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let arg = std::env::args().nth(1);
    let mut agent = ClientSyncAgent::new();

    match arg.as_deref() {
        Some("--local") => {
            tracing::info!("Playing locally");
            agent.toggle();
        }
        other => {
            let url = other.map(str::to_string).unwrap_or_else(ws_url_from_env);
            tracing::info!("Connecting to {}", url);
            agent.connect(&url);
        }
    }

    let mut started = false;
    let mut last_score = (0, 0);
    loop {
        let world = *agent.world();
        let keys = if agent.is_networked() {
            agent
                .side()
                .map(|side| autopilot(&world, side))
                .unwrap_or_default()
        } else {
            both_sides(&world)
        };

        for notice in agent.frame(keys) {
            tracing::warn!("{}", notice);
        }

        if agent.is_networked() && agent.side().is_some() && !started {
            // Seated: start play if the server is paused.
            if !agent.world().running {
                agent.toggle();
            }
            started = true;
        }
        if !agent.is_networked() && !agent.world().running {
            // Local play pauses after each point.
            agent.toggle();
        }

        let world = agent.world();
        let score = (world.left.score, world.right.score);
        if score != last_score {
            tracing::info!("Score {} - {}", score.0, score.1);
            last_score = score;
        }

        std::thread::sleep(FRAME);
    }
}

fn both_sides(world: &pong_shared::world::WorldState) -> InputFlags {
    let left = autopilot(world, Side::Left);
    let right = autopilot(world, Side::Right);
    InputFlags {
        w: left.w,
        s: left.s,
        up: right.up,
        down: right.down,
    }
}

fn ws_url_from_env() -> String {
    std::env::var("PONG_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:10002/ws".to_string())
}
