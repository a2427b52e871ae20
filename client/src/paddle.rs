//! Paddles: arcs on the arena rim, each owned by one player

use crate::geometry::Vec2;
use log::trace;
use shared::protocol::RebalanceTeam;
use shared::{BALL_RADIUS, BALL_RADIUS_ANGLE, CIRCLE_RADIUS, LINE_WIDTH, W_PADDING};
use std::collections::VecDeque;

/// Radius of the inner edge of the collision quad.
pub const INNER_RADIUS: f32 = CIRCLE_RADIUS - (LINE_WIDTH - 3.0 + W_PADDING + BALL_RADIUS) / 2.0;
/// Radius of the outer corners of the collision quad.
pub const OUTER_RADIUS: f32 = CIRCLE_RADIUS + (LINE_WIDTH + 3.0 + W_PADDING + BALL_RADIUS) / 2.0;
/// Angle the outer corners are pulled inwards (1.75 degrees).
const OUTER_SHIFT: f32 = 0.030_543_262;

/// Weight of the newest movement in the paddle's spin.
const SPIN_BLEND: f32 = 0.25;
/// Per-tick spin decay.
const SPIN_DECAY: f32 = 0.8;

/// Allowed `pos` range for paddles of one team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamBounds {
    pub min_pos: f32,
    pub max_pos: f32,
}

impl TeamBounds {
    pub fn new(min_pos: f32, max_pos: f32) -> Self {
        Self { min_pos, max_pos }
    }

    pub fn for_team(team_nr: u8, team_count: u8, w_angle: f32) -> Self {
        let (min_pos, max_pos) = shared::team_bounds(team_nr, team_count, w_angle);
        Self { min_pos, max_pos }
    }

    pub fn clamp(&self, pos: f32) -> f32 {
        pos.max(self.min_pos).min(self.max_pos)
    }
}

impl From<RebalanceTeam> for TeamBounds {
    fn from(rebalance: RebalanceTeam) -> Self {
        Self::new(rebalance.min_pos, rebalance.max_pos)
    }
}

/// Collision quad around a paddle arc.
///
/// `top_left`/`top_right` lie on [`INNER_RADIUS`] at the far and near end of
/// the arc (padded by the ball's angular radius); the bottom corners lie on
/// [`OUTER_RADIUS`], shifted slightly towards the middle of the arc.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingQuad {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl BoundingQuad {
    pub fn around(pos: f32, w_angle: f32) -> Self {
        Self {
            top_left: Vec2::on_arena_circle(pos + w_angle + BALL_RADIUS_ANGLE, INNER_RADIUS),
            top_right: Vec2::on_arena_circle(pos - BALL_RADIUS_ANGLE, INNER_RADIUS),
            bottom_left: Vec2::on_arena_circle(
                pos - OUTER_SHIFT + w_angle + BALL_RADIUS_ANGLE,
                OUTER_RADIUS,
            ),
            bottom_right: Vec2::on_arena_circle(
                pos + OUTER_SHIFT - BALL_RADIUS_ANGLE,
                OUTER_RADIUS,
            ),
        }
    }

    /// Edges tested against a moving ball, in order.
    pub fn collision_edges(&self) -> [(Vec2, Vec2); 2] {
        [
            (self.top_left, self.top_right),
            (self.bottom_left, self.top_right),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteSample {
    pub pos: f32,
    /// Local receive time (ms).
    pub ts: f64,
}

/// Received positions of a remote paddle, replayed `render_delay_ms` in the past.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTrack {
    samples: VecDeque<RemoteSample>,
    render_delay_ms: f64,
}

impl RemoteTrack {
    pub fn new(render_delay_ms: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            render_delay_ms,
        }
    }

    pub fn push(&mut self, pos: f32, ts: f64) {
        self.samples.push_back(RemoteSample { pos, ts });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Position to render at `now`, if any.
    ///
    /// Samples older than the render time are dropped, except the newest one.
    /// A lone sample is applied once it is a full render delay older than the
    /// render time, since the server does not resend positions that did not change.
    pub fn sample_at(&mut self, now: f64) -> Option<f32> {
        let render_ts = now - self.render_delay_ms;

        while self.samples.len() >= 2 && self.samples[1].ts <= render_ts {
            self.samples.pop_front();
        }

        match (self.samples.front(), self.samples.get(1)) {
            (Some(only), None) if only.ts <= render_ts - self.render_delay_ms => Some(only.pos),
            (Some(p0), Some(p1)) if p0.ts <= render_ts && render_ts <= p1.ts => {
                let span = p1.ts - p0.ts;
                let t = if span > 0.0 {
                    ((render_ts - p0.ts) / span) as f32
                } else {
                    1.0
                };
                Some(p0.pos + (p1.pos - p0.pos) * t)
            }
            _ => None,
        }
    }
}

/// Who decides where a paddle goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Steering {
    /// Driven by local input and corrected by reconciliation.
    Local,
    /// Driven by buffered server positions.
    Remote(RemoteTrack),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub pos: f32,
    pub old_pos: f32,
    pub w_angle: f32,
    pub team_nr: u8,
    pub name: String,
    /// Angular velocity estimate imparted to balls on hit.
    pub spin: f32,
    quad: BoundingQuad,
    steering: Steering,
}

impl Paddle {
    pub fn new(pos: f32, w_angle: f32, team_nr: u8, name: String, steering: Steering) -> Self {
        Self {
            pos,
            old_pos: pos,
            w_angle,
            team_nr,
            name,
            spin: 0.0,
            quad: BoundingQuad::around(pos, w_angle),
            steering,
        }
    }

    pub fn local(pos: f32, w_angle: f32, team_nr: u8, name: String) -> Self {
        Self::new(pos, w_angle, team_nr, name, Steering::Local)
    }

    pub fn remote(pos: f32, w_angle: f32, team_nr: u8, name: String, render_delay_ms: f64) -> Self {
        Self::new(
            pos,
            w_angle,
            team_nr,
            name,
            Steering::Remote(RemoteTrack::new(render_delay_ms)),
        )
    }

    pub fn is_local(&self) -> bool {
        matches!(self.steering, Steering::Local)
    }

    pub fn steering(&self) -> &Steering {
        &self.steering
    }

    pub fn quad(&self) -> &BoundingQuad {
        &self.quad
    }

    /// Angle of the middle of the arc.
    pub fn center_angle(&self) -> f32 {
        self.pos + self.w_angle / 2.0
    }

    pub fn move_to(&mut self, pos: f32) {
        self.old_pos = self.pos;
        self.pos = pos;
        self.spin = self.spin * (1.0 - SPIN_BLEND) + SPIN_BLEND * (self.pos - self.old_pos) * 2.0;
        self.quad = BoundingQuad::around(self.pos, self.w_angle);
    }

    /// Applies a new arc width and team range, keeping the arc centred where possible.
    pub fn rebalance(&mut self, min_pos: f32, max_pos: f32, w_angle: f32) {
        let diff = w_angle - self.w_angle;
        self.w_angle = w_angle;
        self.move_to((self.pos - diff / 2.0).max(min_pos).min(max_pos));
        self.old_pos = self.pos;
    }

    /// Queues a server position for a remote paddle. Returns `false` for the local paddle.
    pub fn buffer_move(&mut self, pos: f32, now: f64) -> bool {
        match &mut self.steering {
            Steering::Remote(track) => {
                track.push(pos, now);
                true
            }
            Steering::Local => false,
        }
    }

    /// Per-frame update: remote paddles follow their track, every paddle's spin decays.
    pub fn tick(&mut self, now: f64) {
        if let Steering::Remote(track) = &mut self.steering {
            if let Some(pos) = track.sample_at(now) {
                trace!("Remote paddle {} interpolated to {:.4}", self.name, pos);
                self.move_to(pos);
            }
        }
        self.spin *= SPIN_DECAY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_quad_radii() {
        assert_eq!(INNER_RADIUS, 290.5);
        assert_eq!(OUTER_RADIUS, 312.5);
        assert_approx_eq!(OUTER_SHIFT, 1.75f32.to_radians(), 1e-7);
    }

    #[test]
    fn test_quad_follows_position() {
        let mut paddle = Paddle::local(0.0, 0.5, 0, "a".to_string());
        paddle.move_to(1.0);
        let quad = paddle.quad();
        assert_approx_eq!(quad.top_right.arena_angle(), 1.0 - BALL_RADIUS_ANGLE, 1e-4);
        assert_approx_eq!(quad.top_left.arena_angle(), 1.5 + BALL_RADIUS_ANGLE, 1e-4);
        assert_approx_eq!((quad.top_left - Vec2::new(400.0, 400.0)).magnitude(), 290.5, 1e-3);
        assert_approx_eq!((quad.bottom_left - Vec2::new(400.0, 400.0)).magnitude(), 312.5, 1e-3);
    }

    #[test]
    fn test_move_to_updates_spin() {
        let mut paddle = Paddle::local(1.0, 0.5, 0, "a".to_string());
        paddle.move_to(1.1);
        assert_approx_eq!(paddle.old_pos, 1.0, 1e-6);
        assert_approx_eq!(paddle.spin, 0.05, 1e-6);

        paddle.tick(0.0);
        assert_approx_eq!(paddle.spin, 0.04, 1e-6);
    }

    #[test]
    fn test_rebalance_keeps_arc_centred() {
        let mut paddle = Paddle::local(1.0, 0.5, 0, "a".to_string());
        paddle.rebalance(0.0, 3.0, 0.7);
        assert_approx_eq!(paddle.pos, 0.9, 1e-6);
        assert_approx_eq!(paddle.old_pos, paddle.pos, 1e-9);
        assert_approx_eq!(paddle.center_angle(), 1.25, 1e-6);
    }

    #[test]
    fn test_rebalance_clamps() {
        let mut paddle = Paddle::local(0.1, 0.5, 0, "a".to_string());
        paddle.rebalance(0.2, 3.0, 0.7);
        assert_approx_eq!(paddle.pos, 0.2, 1e-6);
    }

    #[test]
    fn test_team_bounds_clamp() {
        let bounds = TeamBounds::new(1.0, 2.0);
        assert_eq!(bounds.clamp(0.5), 1.0);
        assert_eq!(bounds.clamp(2.5), 2.0);
        assert_eq!(bounds.clamp(1.5), 1.5);
    }

    #[test]
    fn test_interpolation_between_samples() {
        let mut track = RemoteTrack::new(50.0);
        track.push(1.0, 100.0);
        track.push(2.0, 150.0);
        track.push(3.0, 200.0);

        assert_approx_eq!(track.sample_at(175.0).unwrap(), 1.5, 1e-6);
        assert_approx_eq!(track.sample_at(200.0).unwrap(), 2.0, 1e-6);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_interpolation_waits_for_render_time() {
        let mut track = RemoteTrack::new(50.0);
        track.push(1.0, 100.0);
        track.push(2.0, 150.0);
        assert_eq!(track.sample_at(120.0), None);
    }

    #[test]
    fn test_lone_sample_snaps_after_full_delay() {
        let mut track = RemoteTrack::new(50.0);
        track.push(4.0, 100.0);
        assert_eq!(track.sample_at(180.0), None);
        assert_eq!(track.sample_at(200.0), Some(4.0));
    }

    #[test]
    fn test_remote_paddle_follows_track() {
        let mut paddle = Paddle::remote(1.0, 0.5, 1, "b".to_string(), 50.0);
        assert!(paddle.buffer_move(1.0, 0.0));
        assert!(paddle.buffer_move(1.2, 50.0));
        paddle.tick(75.0);
        assert_approx_eq!(paddle.pos, 1.1, 1e-6);

        let mut local = Paddle::local(1.0, 0.5, 0, "a".to_string());
        assert!(!local.buffer_move(2.0, 0.0));
    }
}
