//! Field geometry and physics tuning shared by server and client.
//!
//! The geometry constants are fixed: existing clients draw with them, so they
//! are not part of [`PhysicsConfig`].

/// Logical field width.
pub const FIELD_WIDTH: f64 = 800.0;
/// Logical field height.
pub const FIELD_HEIGHT: f64 = 450.0;

pub const PADDLE_HEIGHT: f64 = 80.0;
pub const PADDLE_WIDTH: f64 = 12.0;
/// Distance from the field edge to the outer face of each paddle.
pub const PADDLE_INSET: f64 = 20.0;

pub const BALL_RADIUS: f64 = 9.0;

/// Lowest reachable paddle top edge.
pub const PADDLE_MAX_Y: f64 = FIELD_HEIGHT - PADDLE_HEIGHT;

/// Left edge of the left paddle.
pub const LEFT_PADDLE_X: f64 = PADDLE_INSET;
/// Left edge of the right paddle.
pub const RIGHT_PADDLE_X: f64 = FIELD_WIDTH - PADDLE_INSET - PADDLE_WIDTH;

/// Physics tuning. The server holds its own copy; local play always uses
/// [`Default`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Paddle travel per tick while a direction is held.
    pub paddle_speed: f64,
    /// Horizontal speed of every serve.
    pub serve_speed: f64,
    /// Serves draw `vy` uniformly from `[-serve_vy_range, serve_vy_range)`.
    pub serve_vy_range: f64,
    /// Speed multiplier applied on each paddle bounce.
    pub bounce_speed_up: f64,
    /// Largest deflection off a paddle edge (radians).
    pub max_bounce_angle: f64,
    /// Optional ceiling on ball speed after a bounce. `None` means uncapped.
    pub max_ball_speed: Option<f64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            paddle_speed: 6.0,
            serve_speed: 5.0,
            serve_vy_range: 3.0,
            bounce_speed_up: 1.05,
            max_bounce_angle: std::f64::consts::FRAC_PI_3, // 60 degrees
            max_ball_speed: None,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.paddle_speed.is_finite() || self.paddle_speed <= 0.0 {
            return Err("paddle_speed must be finite and > 0".to_string());
        }
        if !self.serve_speed.is_finite() || self.serve_speed <= 0.0 {
            return Err("serve_speed must be finite and > 0".to_string());
        }
        if !self.serve_vy_range.is_finite() || self.serve_vy_range < 0.0 {
            return Err("serve_vy_range must be finite and >= 0".to_string());
        }
        if !self.bounce_speed_up.is_finite() || self.bounce_speed_up < 1.0 {
            return Err("bounce_speed_up must be finite and >= 1".to_string());
        }
        if !self.max_bounce_angle.is_finite()
            || self.max_bounce_angle <= 0.0
            || self.max_bounce_angle >= std::f64::consts::FRAC_PI_2
        {
            return Err("max_bounce_angle must be in (0, PI/2)".to_string());
        }
        if let Some(max) = self.max_ball_speed {
            if !max.is_finite() || max < self.serve_speed {
                return Err("max_ball_speed must be finite and >= serve_speed".to_string());
            }
        }
        Ok(())
    }
}
