//! A simple paddle bot standing in for a human at the keyboard.

use pong_shared::world::{InputFlags, PaddleIntent, Side, WorldState};

/// Ignore offsets smaller than this to stop the paddle jittering around the ball.
const DEAD_ZONE: f64 = 10.0;

/// Keys that move `side`'s paddle toward the ball while it approaches, and
/// back toward the middle while it leaves.
pub fn autopilot(world: &WorldState, side: Side) -> InputFlags {
    let paddle = world.paddle(side);
    let approaching = match side {
        Side::Left => world.ball.vx < 0.0,
        Side::Right => world.ball.vx > 0.0,
    };
    let target = if approaching {
        world.ball.y
    } else {
        pong_shared::config::FIELD_HEIGHT / 2.0
    };

    let offset = target - paddle.center_y();
    let intent = if offset < -DEAD_ZONE {
        PaddleIntent::Up
    } else if offset > DEAD_ZONE {
        PaddleIntent::Down
    } else {
        PaddleIntent::Idle
    };
    keys_for(side, intent)
}

/// The key snapshot that expresses `intent` for `side`.
pub fn keys_for(side: Side, intent: PaddleIntent) -> InputFlags {
    let (up, down) = match intent {
        PaddleIntent::Idle => (false, false),
        PaddleIntent::Up => (true, false),
        PaddleIntent::Down => (false, true),
    };
    match side {
        Side::Left => InputFlags {
            w: up,
            s: down,
            ..Default::default()
        },
        Side::Right => InputFlags {
            up,
            down,
            ..Default::default()
        },
    }
}
