//! Sources of the target angle the local paddle steers towards

use crate::game::Match;
use crate::geometry::Vec2;
use shared::{arena_center, FIELD_HEIGHT, FIELD_WIDTH};

/// Pointer state in screen space. The angle is measured around the middle of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    half_width: f32,
    half_height: f32,
    angle: f32,
}

impl PointerInput {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
            angle: 0.0,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.half_width = width / 2.0;
        self.half_height = height / 2.0;
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.set_direction(x - self.half_width, y - self.half_height);
    }

    /// Stick-style input: any vector, its direction is the angle.
    pub fn set_direction(&mut self, x: f32, y: f32) {
        self.angle = y.atan2(x);
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }
}

/// Steers the local paddle without a human: follows the ball that is closest
/// to leaving through the local team's arc.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPilot;

impl AutoPilot {
    pub fn target(&self, game: &Match) -> f32 {
        let Some(paddle) = game.local_paddle() else {
            return game.rotation();
        };

        let bounds = game.bounds();
        let arc_start = bounds.min_pos;
        let arc_end = bounds.max_pos + paddle.w_angle;
        let (cx, cy) = arena_center();
        let center = Vec2::new(cx, cy);

        let threat = game
            .balls()
            .iter()
            .filter(|ball| ball.vel.dot(ball.pos - center) > 0.0)
            .map(|ball| (ball.pos.arena_angle(), (ball.pos - center).length_squared()))
            .filter(|(angle, _)| (arc_start..=arc_end).contains(angle))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let field_angle = match threat {
            Some((angle, _)) => angle,
            None => (arc_start + arc_end) / 2.0,
        };
        field_angle + game.rotation()
    }
}

/// Where the headless client takes its target angle from.
#[derive(Debug, Clone, Copy)]
pub enum InputSource {
    Pilot(AutoPilot),
    /// Holds whatever angle the pointer was last set to.
    Pointer(PointerInput),
}

impl InputSource {
    /// Pointer input held at `angle` (screen space) on a field-sized surface.
    pub fn hold(angle: f32) -> Self {
        let mut pointer = PointerInput::new(FIELD_WIDTH, FIELD_HEIGHT);
        pointer.set_angle(angle);
        InputSource::Pointer(pointer)
    }

    pub fn target(&self, game: &Match) -> f32 {
        match self {
            InputSource::Pilot(pilot) => pilot.target(game),
            InputSource::Pointer(pointer) => pointer.angle(),
        }
    }
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Pilot(AutoPilot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockSync;
    use crate::config::Tuning;
    use assert_approx_eq::assert_approx_eq;
    use shared::protocol::{BallState, StartMessage, StartPlayer};
    use std::f32::consts::PI;

    fn game_with_balls(balls: Vec<BallState>) -> Match {
        let start = StartMessage {
            team_count: 2,
            spin_towards_center: false,
            match_time: 150.0,
            players: vec![StartPlayer {
                client_id: 1,
                team_nr: 1,
                pos: 4.0,
                w_angle: 0.4,
            }],
            balls,
        };
        Match::new(
            1,
            "bot",
            &[],
            &start,
            0.0,
            &ClockSync::default(),
            &Tuning::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_pointer_angle_around_center() {
        let mut input = PointerInput::new(800.0, 600.0);
        input.pointer_moved(400.0, 500.0);
        assert_approx_eq!(input.angle(), PI / 2.0, 1e-6);

        input.resize(200.0, 200.0);
        input.pointer_moved(0.0, 100.0);
        assert_approx_eq!(input.angle(), PI, 1e-6);

        input.set_direction(0.0, -1.0);
        assert_approx_eq!(input.angle(), -PI / 2.0, 1e-6);
    }

    #[test]
    fn test_input_sources() {
        let game = game_with_balls(Vec::new());
        assert_approx_eq!(InputSource::hold(0.7).target(&game), 0.7, 1e-6);
        assert_approx_eq!(
            InputSource::default().target(&game),
            AutoPilot.target(&game),
            1e-6
        );

        let InputSource::Pointer(mut pointer) = InputSource::hold(0.0) else {
            panic!("hold should use pointer input");
        };
        pointer.pointer_moved(800.0, 400.0);
        assert_approx_eq!(pointer.angle(), 0.0, 1e-6);
    }

    #[test]
    fn test_autopilot_follows_outgoing_ball() {
        let ball_angle = 4.5f32;
        let pos = Vec2::on_arena_circle(ball_angle, 200.0);
        let game = game_with_balls(vec![BallState {
            x: pos.x,
            y: pos.y,
            dx: ball_angle.cos(),
            dy: ball_angle.sin(),
            spin: 0.0,
        }]);

        let target = AutoPilot.target(&game);
        assert_approx_eq!(target - game.rotation(), ball_angle, 1e-4);
    }

    #[test]
    fn test_autopilot_centres_without_threat() {
        let game = game_with_balls(vec![BallState {
            x: 400.0,
            y: 400.0,
            dx: 1.0,
            dy: 0.0,
            spin: 0.0,
        }]);

        let target = AutoPilot.target(&game) - game.rotation();
        assert_approx_eq!(target, 1.5 * PI, 1e-5);
    }
}
