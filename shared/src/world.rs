use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::{BALL_RADIUS, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_HEIGHT, PADDLE_MAX_Y};

/// One of the two player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct Paddle {
    /// Top edge. Always within `[0, PADDLE_MAX_Y]`.
    pub y: f64,
    pub score: u32,
}

impl Paddle {
    pub fn centered() -> Self {
        Self {
            y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
            score: 0,
        }
    }

    /// Move by `dy` and clamp back onto the field.
    pub fn shift(&mut self, dy: f64) {
        self.y = (self.y + dy).clamp(0.0, PADDLE_MAX_Y);
    }

    pub fn center_y(&self) -> f64 {
        self.y + PADDLE_HEIGHT / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Ball {
    pub fn centered(vx: f64, vy: f64) -> Self {
        Self {
            x: FIELD_WIDTH / 2.0,
            y: FIELD_HEIGHT / 2.0,
            vx,
            vy,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    pub fn top(&self) -> f64 {
        self.y - BALL_RADIUS
    }

    pub fn bottom(&self) -> f64 {
        self.y + BALL_RADIUS
    }
}

/// The whole simulated world. A snapshot of this is what goes over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct WorldState {
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    pub running: bool,
}

impl Default for WorldState {
    /// Paused world with centered paddles and the opening serve heading right.
    fn default() -> Self {
        Self {
            left: Paddle::centered(),
            right: Paddle::centered(),
            ball: Ball::centered(5.0, 2.5),
            running: false,
        }
    }
}

impl WorldState {
    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Raw held-key snapshot as sent by clients. `w`/`s` drive the left paddle,
/// `up`/`down` the right one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct InputFlags {
    #[serde(default)]
    pub w: bool,
    #[serde(default)]
    pub s: bool,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
}

impl InputFlags {
    pub fn any(&self) -> bool {
        self.w || self.s || self.up || self.down
    }

    /// The direction these keys ask of `side`'s paddle.
    pub fn intent_for(&self, side: Side) -> PaddleIntent {
        match side {
            Side::Left => PaddleIntent::from_keys(self.w, self.s),
            Side::Right => PaddleIntent::from_keys(self.up, self.down),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaddleIntent {
    #[default]
    Idle,
    Up,
    Down,
}

impl PaddleIntent {
    /// Opposing keys cancel out.
    pub fn from_keys(up: bool, down: bool) -> Self {
        match (up, down) {
            (true, false) => PaddleIntent::Up,
            (false, true) => PaddleIntent::Down,
            _ => PaddleIntent::Idle,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            PaddleIntent::Idle => 0.0,
            PaddleIntent::Up => -1.0,
            PaddleIntent::Down => 1.0,
        }
    }
}

/// Per-seat intents for one tick. Seats nobody controls stay `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: PaddleIntent,
    pub right: PaddleIntent,
}

impl Controls {
    /// Both seats driven from one keyboard, as in local play.
    pub fn from_keyboard(flags: InputFlags) -> Self {
        Self {
            left: flags.intent_for(Side::Left),
            right: flags.intent_for(Side::Right),
        }
    }

    pub fn get(&self, side: Side) -> PaddleIntent {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set(&mut self, side: Side, intent: PaddleIntent) {
        match side {
            Side::Left => self.left = intent,
            Side::Right => self.right = intent,
        }
    }
}
