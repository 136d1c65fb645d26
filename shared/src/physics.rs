//! Fixed-step simulation shared by the authoritative server and local play.
//!
//! Everything here is pure: the caller owns the world, the randomness and any
//! logging. One call to [`step`] is one tick.

use rand::Rng;

use crate::config::{
    PhysicsConfig, BALL_RADIUS, FIELD_HEIGHT, FIELD_WIDTH, LEFT_PADDLE_X, PADDLE_HEIGHT,
    PADDLE_WIDTH, RIGHT_PADDLE_X,
};
use crate::world::{Ball, Controls, Paddle, Side, WorldState};

/// Gap left between a paddle face and the ball after a bounce.
const BOUNCE_CLEARANCE: f64 = 0.1;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub wall_bounce: bool,
    pub paddle_hit: Option<Side>,
    pub scored: Option<Side>,
}

/// Advance the world by one tick.
///
/// Order: paddles, ball integration, top/bottom walls, paddles, scoring. A
/// ball touching a wall and a paddle in the same tick resolves both.
pub fn step(
    world: &mut WorldState,
    controls: Controls,
    config: &PhysicsConfig,
    rng: &mut impl Rng,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    for side in Side::ALL {
        let dy = controls.get(side).sign() * config.paddle_speed;
        world.paddle_mut(side).shift(dy);
    }

    let prev_x = world.ball.x;
    let ball = &mut world.ball;
    ball.x += ball.vx;
    ball.y += ball.vy;

    if ball.top() <= 0.0 {
        ball.y = BALL_RADIUS;
        ball.vy = -ball.vy;
        outcome.wall_bounce = true;
    } else if ball.bottom() >= FIELD_HEIGHT {
        ball.y = FIELD_HEIGHT - BALL_RADIUS;
        ball.vy = -ball.vy;
        outcome.wall_bounce = true;
    }

    if hits_left(ball, prev_x, &world.left) {
        bounce(ball, &world.left, 1.0, config);
        ball.x = LEFT_PADDLE_X + PADDLE_WIDTH + BALL_RADIUS + BOUNCE_CLEARANCE;
        outcome.paddle_hit = Some(Side::Left);
    } else if hits_right(ball, prev_x, &world.right) {
        bounce(ball, &world.right, -1.0, config);
        ball.x = RIGHT_PADDLE_X - BALL_RADIUS - BOUNCE_CLEARANCE;
        outcome.paddle_hit = Some(Side::Right);
    }

    if ball.x + BALL_RADIUS < 0.0 {
        world.right.score += 1;
        serve(&mut world.ball, 1.0, config, rng);
        outcome.scored = Some(Side::Right);
    } else if ball.x - BALL_RADIUS > FIELD_WIDTH {
        world.left.score += 1;
        serve(&mut world.ball, -1.0, config, rng);
        outcome.scored = Some(Side::Left);
    }

    outcome
}

/// Zero the scores, recenter paddles and ball, serve in a random direction
/// and pause.
pub fn reset(world: &mut WorldState, config: &PhysicsConfig, rng: &mut impl Rng) {
    world.left = Paddle::centered();
    world.right = Paddle::centered();
    world.running = false;
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    serve(&mut world.ball, direction, config, rng);
}

/// Recenter the ball and send it horizontally in `direction` (+1 right, -1
/// left) with a random vertical component.
pub fn serve(ball: &mut Ball, direction: f64, config: &PhysicsConfig, rng: &mut impl Rng) {
    let range = config.serve_vy_range;
    let vy = if range > 0.0 {
        rng.gen_range(-range..range)
    } else {
        0.0
    };
    *ball = Ball::centered(direction.signum() * config.serve_speed, vy);
}

/// The leading edge swept across the paddle's band this tick while the
/// center is level with the paddle.
fn hits_left(ball: &Ball, prev_x: f64, paddle: &Paddle) -> bool {
    let back = LEFT_PADDLE_X;
    let front = LEFT_PADDLE_X + PADDLE_WIDTH;
    let lead = ball.x - BALL_RADIUS;
    let prev_lead = prev_x - BALL_RADIUS;
    lead.min(prev_lead) <= front && lead.max(prev_lead) >= back && level_with(ball, paddle)
}

fn hits_right(ball: &Ball, prev_x: f64, paddle: &Paddle) -> bool {
    let front = RIGHT_PADDLE_X;
    let back = RIGHT_PADDLE_X + PADDLE_WIDTH;
    let lead = ball.x + BALL_RADIUS;
    let prev_lead = prev_x + BALL_RADIUS;
    lead.max(prev_lead) >= front && lead.min(prev_lead) <= back && level_with(ball, paddle)
}

fn level_with(ball: &Ball, paddle: &Paddle) -> bool {
    ball.y >= paddle.y && ball.y <= paddle.y + PADDLE_HEIGHT
}

/// Deflect off `paddle` by where the ball struck it, speeding up, with the
/// horizontal velocity forced to `direction`.
fn bounce(ball: &mut Ball, paddle: &Paddle, direction: f64, config: &PhysicsConfig) {
    let relative = ((ball.y - paddle.center_y()) / (PADDLE_HEIGHT / 2.0)).clamp(-1.0, 1.0);
    let angle = relative * config.max_bounce_angle;
    let mut speed = ball.speed() * config.bounce_speed_up;
    if let Some(max) = config.max_ball_speed {
        speed = speed.min(max);
    }
    ball.vx = direction * (angle.cos() * speed).abs();
    ball.vy = angle.sin() * speed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PADDLE_MAX_Y;
    use crate::world::PaddleIntent;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn running_world(ball: Ball) -> WorldState {
        WorldState {
            ball,
            running: true,
            ..Default::default()
        }
    }

    #[test]
    fn ball_past_right_edge_scores_left_and_serves_left() {
        let mut world = running_world(Ball {
            x: 805.0,
            y: 225.0,
            vx: 5.0,
            vy: 0.0,
        });
        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert_eq!(outcome.scored, Some(Side::Left));
        assert_eq!(world.left.score, 1);
        assert_eq!(world.right.score, 0);
        assert_eq!((world.ball.x, world.ball.y), (400.0, 225.0));
        assert_eq!(world.ball.vx, -5.0);
        assert!((-3.0..3.0).contains(&world.ball.vy));
        assert!(world.running, "scoring never pauses the world by itself");
    }

    #[test]
    fn ball_past_left_edge_scores_right_and_serves_right() {
        let mut world = running_world(Ball {
            x: -5.0,
            y: 30.0,
            vx: -5.0,
            vy: 0.0,
        });
        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert_eq!(outcome.scored, Some(Side::Right));
        assert_eq!(world.right.score, 1);
        assert_eq!(world.ball.vx, 5.0);
    }

    #[test]
    fn top_wall_clamps_and_reflects() {
        let mut world = running_world(Ball {
            x: 400.0,
            y: 2.0,
            vx: 5.0,
            vy: -3.0,
        });
        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert!(outcome.wall_bounce);
        assert_eq!(world.ball.y, 9.0);
        assert_eq!(world.ball.vy, 3.0);
    }

    #[test]
    fn bottom_wall_clamps_and_reflects() {
        let mut world = running_world(Ball {
            x: 400.0,
            y: 440.0,
            vx: -5.0,
            vy: 4.5,
        });
        step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert_eq!(world.ball.y, FIELD_HEIGHT - BALL_RADIUS);
        assert_eq!(world.ball.vy, -4.5);
    }

    #[test]
    fn center_hit_on_left_paddle_returns_flat() {
        // Paddle spans 185..265, center 225.
        let mut world = running_world(Ball {
            x: 45.0,
            y: 225.0,
            vx: -6.0,
            vy: 0.0,
        });
        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert_eq!(outcome.paddle_hit, Some(Side::Left));
        assert!((world.ball.vx - 6.3).abs() < 1e-9);
        assert!(world.ball.vy.abs() < 1e-9);
        assert!((world.ball.x - 41.1).abs() < 1e-9);
    }

    #[test]
    fn edge_hit_deflects_sixty_degrees() {
        let mut world = running_world(Ball {
            x: RIGHT_PADDLE_X - BALL_RADIUS - 2.0,
            y: 265.0,
            vx: 4.0,
            vy: 0.0,
        });
        step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        let speed = 4.0 * 1.05;
        assert!((world.ball.vx + speed * 0.5).abs() < 1e-9);
        assert!((world.ball.vy - speed * (3f64).sqrt() / 2.0).abs() < 1e-9);
        assert!(world.ball.x + BALL_RADIUS < RIGHT_PADDLE_X);
    }

    #[test]
    fn fast_ball_cannot_tunnel_through_paddle() {
        let front = LEFT_PADDLE_X + PADDLE_WIDTH;
        let mut world = running_world(Ball {
            x: front + BALL_RADIUS + 20.0,
            y: 225.0,
            vx: -40.0,
            vy: 0.0,
        });
        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert_eq!(outcome.paddle_hit, Some(Side::Left));
        assert!(world.ball.vx > 0.0);
    }

    #[test]
    fn ball_beside_paddle_passes_and_scores() {
        let mut world = running_world(Ball {
            x: 60.0,
            y: 40.0,
            vx: -8.0,
            vy: 0.0,
        });
        let mut rng = rng();
        let mut scored = None;
        for _ in 0..20 {
            let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng);
            assert_eq!(outcome.paddle_hit, None);
            if outcome.scored.is_some() {
                scored = outcome.scored;
                break;
            }
        }
        assert_eq!(scored, Some(Side::Right));
    }

    #[test]
    fn max_ball_speed_caps_bounces() {
        let config = PhysicsConfig {
            max_ball_speed: Some(10.0),
            ..Default::default()
        };
        let mut world = running_world(Ball {
            x: 50.0,
            y: 225.0,
            vx: -10.0,
            vy: 0.0,
        });
        step(&mut world, Controls::default(), &config, &mut rng());
        assert!((world.ball.speed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn held_input_moves_paddles_by_paddle_speed() {
        let mut world = running_world(Ball::centered(5.0, 0.0));
        let controls = Controls {
            left: PaddleIntent::Up,
            right: PaddleIntent::Down,
        };
        step(&mut world, controls, &PhysicsConfig::default(), &mut rng());
        assert_eq!(world.left.y, 179.0);
        assert_eq!(world.right.y, 191.0);
    }

    #[test]
    fn reset_pauses_and_reserves() {
        let mut rng = rng();
        for _ in 0..50 {
            let mut world = running_world(Ball {
                x: 12.0,
                y: 30.0,
                vx: -17.0,
                vy: 9.0,
            });
            world.left = Paddle { y: 0.0, score: 4 };
            world.right = Paddle { y: 370.0, score: 2 };

            reset(&mut world, &PhysicsConfig::default(), &mut rng);

            assert!(!world.running);
            assert_eq!((world.left.score, world.right.score), (0, 0));
            assert_eq!((world.left.y, world.right.y), (185.0, 185.0));
            assert_eq!((world.ball.x, world.ball.y), (400.0, 225.0));
            assert_eq!(world.ball.vx.abs(), 5.0);
            assert!((-3.0..3.0).contains(&world.ball.vy));
        }
    }

    #[test]
    fn reset_serves_both_directions() {
        let mut rng = rng();
        let mut world = WorldState::default();
        let mut seen = (false, false);
        for _ in 0..64 {
            reset(&mut world, &PhysicsConfig::default(), &mut rng);
            if world.ball.vx > 0.0 {
                seen.0 = true;
            } else {
                seen.1 = true;
            }
        }
        assert_eq!(seen, (true, true));
    }

    fn intent() -> impl Strategy<Value = PaddleIntent> {
        prop_oneof![
            Just(PaddleIntent::Idle),
            Just(PaddleIntent::Up),
            Just(PaddleIntent::Down),
        ]
    }

    #[test]
    fn wall_and_paddle_in_one_tick_resolve_both() {
        let mut world = running_world(Ball {
            x: 45.0,
            y: 12.0,
            vx: -6.0,
            vy: -6.0,
        });
        world.left.y = 0.0;
        let before = world.ball.speed();

        let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

        assert!(outcome.wall_bounce);
        assert_eq!(outcome.paddle_hit, Some(Side::Left));
        assert_eq!(outcome.scored, None);
        assert_eq!(world.ball.y, 9.0);
        assert!(world.ball.vx > 0.0);
        assert!((world.ball.speed() / before - 1.05).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn paddles_never_leave_field(
            start in 0.0..=PADDLE_MAX_Y,
            inputs in prop::collection::vec((intent(), intent()), 1..600),
        ) {
            let mut world = running_world(Ball::centered(5.0, 1.0));
            world.left.y = start;
            world.right.y = start;
            let mut rng = rng();
            for (left, right) in inputs {
                step(&mut world, Controls { left, right }, &PhysicsConfig::default(), &mut rng);
                prop_assert!((0.0..=PADDLE_MAX_Y).contains(&world.left.y));
                prop_assert!((0.0..=PADDLE_MAX_Y).contains(&world.right.y));
            }
        }

        #[test]
        fn wall_bounce_flips_vy_exactly(x in 100.0..700.0f64, vy in 0.5..20.0f64, up in any::<bool>()) {
            let (y, vy) = if up { (BALL_RADIUS + 0.25, -vy) } else { (FIELD_HEIGHT - BALL_RADIUS - 0.25, vy) };
            let mut world = running_world(Ball { x, y, vx: 1.0, vy });
            let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

            prop_assert!(outcome.wall_bounce);
            prop_assert_eq!(world.ball.vy, -vy);
            let expected = if up { BALL_RADIUS } else { FIELD_HEIGHT - BALL_RADIUS };
            prop_assert_eq!(world.ball.y, expected);
        }

        #[test]
        fn paddle_bounce_speeds_up_and_reverses(
            offset in 0.5..(PADDLE_HEIGHT - 0.5),
            speed_x in 1.0..30.0f64,
            vy in -8.0..8.0f64,
            right in any::<bool>(),
        ) {
            let paddle_y = 185.0;
            let y = paddle_y + offset - vy;
            let ball = if right {
                Ball { x: RIGHT_PADDLE_X - BALL_RADIUS - speed_x / 2.0, y, vx: speed_x, vy }
            } else {
                Ball { x: LEFT_PADDLE_X + PADDLE_WIDTH + BALL_RADIUS + speed_x / 2.0, y, vx: -speed_x, vy }
            };
            let before = ball.speed();
            let mut world = running_world(ball);
            let outcome = step(&mut world, Controls::default(), &PhysicsConfig::default(), &mut rng());

            let hit = if right { Side::Right } else { Side::Left };
            prop_assert_eq!(outcome.paddle_hit, Some(hit));
            prop_assert!((world.ball.speed() - before * 1.05).abs() < 1e-9);
            if right {
                prop_assert!(world.ball.vx < 0.0);
            } else {
                prop_assert!(world.ball.vx > 0.0);
            }
        }
    }
}
