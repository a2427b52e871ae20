//! Locally simulated balls, nudged towards the server's view on every sync

use crate::geometry::{segment_intersection, Vec2};
use crate::paddle::Paddle;
use log::{debug, trace};
use shared::protocol::{BallState, BALL_FLAG_HIT, BALL_FLAG_SCORED};
use shared::{arena_center, ClientId, BALL_RADIUS_ANGLE, NO_TEAM, TPF};
use std::collections::BTreeMap;

/// Strength of the swerve caused by spin.
pub const ACC: f32 = 0.25;
/// Fraction of the server deviation corrected per frame.
pub const REAL_BLEND: f32 = 0.125 / 4.0;
/// Frames after a hit during which no further collision is tested.
pub const MAX_IGNORE_COLLISION: u32 = 3 + 1;
pub const MAX_RALLIES: u8 = 5;
pub const SPIN_MAX: f32 = 0.05;
/// Hits without a goal that count as a long rally.
pub const LONG_RALLY_HITS: u32 = 25;

const CENTER_SPIN_FACTOR: f32 = 0.01;
/// Direction changes with a cosine below this are audible hits.
const SHARP_DEFLECTION_COS: f32 = 0.7;

/// How a ball's effective spin is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinMode {
    #[default]
    Plain,
    /// Adds a bias that curves the ball towards the arena centre.
    TowardsCenter,
}

impl SpinMode {
    pub fn from_setting(spin_towards_center: bool) -> Self {
        if spin_towards_center {
            SpinMode::TowardsCenter
        } else {
            SpinMode::Plain
        }
    }
}

/// A paddle hit found by [`Ball::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallHit {
    pub paddle: ClientId,
    pub team: u8,
    /// The hit turned the ball enough to be worth feedback.
    pub sharp: bool,
}

/// What [`Ball::sync`] did with a server update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub applied: bool,
    /// The local position was too far off and was replaced.
    pub snapped: bool,
    pub sharp_hit: bool,
    pub long_rally: bool,
}

struct Contact {
    point: Vec2,
    edge: (Vec2, Vec2),
    paddle: ClientId,
    team: u8,
    spin: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub spin: f32,
    pub hit_team: u8,
    pub rallies: u8,
    mode: SpinMode,
    ignore_collision: u32,
    ignore_server_sync: u32,
    /// Deviation from the server position, blended in over the next frames.
    residual: Vec2,
    hits_without_respawning: u32,
}

impl Ball {
    pub fn new(state: &BallState, mode: SpinMode) -> Self {
        Self {
            pos: Vec2::new(state.x, state.y),
            vel: Vec2::new(state.dx, state.dy),
            spin: state.spin,
            hit_team: NO_TEAM,
            rallies: 0,
            mode,
            ignore_collision: 0,
            ignore_server_sync: 0,
            residual: Vec2::ZERO,
            hits_without_respawning: 0,
        }
    }

    pub fn mode(&self) -> SpinMode {
        self.mode
    }

    pub fn residual(&self) -> Vec2 {
        self.residual
    }

    /// Frames left during which plain server updates are ignored.
    pub fn ignore_server_sync(&self) -> u32 {
        self.ignore_server_sync
    }

    pub fn ignore_collision(&self) -> u32 {
        self.ignore_collision
    }

    pub fn effective_spin(&self) -> f32 {
        match self.mode {
            SpinMode::Plain => self.spin,
            SpinMode::TowardsCenter => {
                let (cx, cy) = arena_center();
                let to_center = (Vec2::new(cx, cy) - self.pos).normalize();
                let bias =
                    (self.vel.cross(to_center) * CENTER_SPIN_FACTOR).clamp(-SPIN_MAX, SPIN_MAX);
                bias + self.spin
            }
        }
    }

    /// Advances the ball by `delta` frames and resolves at most one paddle hit.
    ///
    /// `sync_suppression_frames` is how long plain server updates are ignored
    /// after a local hit, so the stale pre-hit state does not undo it.
    pub fn tick(
        &mut self,
        delta: f32,
        paddles: &BTreeMap<ClientId, Paddle>,
        sync_suppression_frames: u32,
    ) -> Option<BallHit> {
        self.vel = swerve(self.vel, self.effective_spin(), delta);

        let next = self.pos + self.residual * REAL_BLEND + self.vel * delta;
        self.residual = self.residual * (1.0 - REAL_BLEND);

        let contact = if self.ignore_collision == 0 {
            self.find_contact(next, paddles)
        } else {
            self.ignore_collision -= 1;
            None
        };

        if self.ignore_server_sync > 0 {
            self.ignore_server_sync -= 1;
        }

        self.pos = next;

        self.bounce(contact?, sync_suppression_frames)
    }

    /// Reflects off the contact edge unless the ball is already moving away from it.
    fn bounce(&mut self, contact: Contact, sync_suppression_frames: u32) -> Option<BallHit> {
        let (a, b) = contact.edge;
        let normal = Vec2::new(b.y - a.y, a.x - b.x).normalize();
        let dot = 2.0 * normal.dot(self.vel);
        if dot > 0.0 {
            trace!("Ball already leaving paddle {}, collision ignored", contact.paddle);
            return None;
        }

        let old_vel = self.vel;
        self.pos = contact.point;
        self.vel = self.vel - normal * dot;
        self.spin = (self.spin * 0.5 + contact.spin).clamp(-SPIN_MAX, SPIN_MAX);
        self.ignore_collision = MAX_IGNORE_COLLISION;
        self.hit_team = contact.team;
        self.rallies = (self.rallies + 1).min(MAX_RALLIES);
        self.ignore_server_sync = sync_suppression_frames;

        Some(BallHit {
            paddle: contact.paddle,
            team: contact.team,
            sharp: is_sharp_deflection(old_vel, self.vel),
        })
    }

    fn find_contact(&self, next: Vec2, paddles: &BTreeMap<ClientId, Paddle>) -> Option<Contact> {
        let angle = self.pos.arena_angle();

        for (&id, paddle) in paddles {
            if paddle.pos > angle + BALL_RADIUS_ANGLE
                || paddle.pos + paddle.w_angle < angle - BALL_RADIUS_ANGLE
            {
                continue;
            }

            for (a, b) in paddle.quad().collision_edges() {
                if let Some(point) = segment_intersection(self.pos, next, a, b) {
                    return Some(Contact {
                        point,
                        edge: (a, b),
                        paddle: id,
                        team: paddle.team_nr,
                        spin: paddle.spin,
                    });
                }
            }
        }

        None
    }

    /// Folds an authoritative ball state into the local simulation.
    ///
    /// The server state is projected `delta_frame` frames forward. Small
    /// deviations are kept as a residual and blended in by [`Ball::tick`];
    /// deviations beyond `tolerance_ticks` server ticks of travel are snapped.
    /// While a local hit is in flight only flagged hits are applied.
    pub fn sync(
        &mut self,
        delta_frame: f32,
        update: &BallState,
        hit_team: u8,
        flags: u8,
        rallies: u8,
        tolerance_ticks: f32,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let old_vel = self.vel;
        let fresh_hit = flags == BALL_FLAG_HIT;

        let vel = swerve(Vec2::new(update.dx, update.dy), update.spin, delta_frame);
        let projected = Vec2::new(update.x, update.y) + vel * delta_frame;

        if fresh_hit || self.ignore_server_sync == 0 {
            let tolerance = TPF * tolerance_ticks;
            let deviation = projected - self.pos;
            if deviation.length_squared() > vel.length_squared() * tolerance * tolerance {
                trace!("Ball snapped over {:.2}", deviation.magnitude());
                self.pos = projected;
                self.residual = Vec2::ZERO;
                report.snapped = true;
            } else {
                self.residual = deviation;
            }

            self.vel = vel;
            self.spin = update.spin;
            self.rallies = rallies;
            self.hit_team = hit_team;
            report.applied = true;
        } else {
            debug!(
                "Server ball update ignored, local hit pending for {} frames",
                self.ignore_server_sync
            );
        }

        if fresh_hit {
            self.ignore_collision = MAX_IGNORE_COLLISION;
            self.ignore_server_sync = 0;
            report.sharp_hit = is_sharp_deflection(old_vel, self.vel);

            self.hits_without_respawning += 1;
            report.long_rally = self.hits_without_respawning == LONG_RALLY_HITS;
        } else if flags == BALL_FLAG_SCORED {
            self.hits_without_respawning = 0;
        }

        report
    }
}

/// Rotates `vel` by the spin for `delta` frames. Spin times `delta` is intentional.
fn swerve(vel: Vec2, spin: f32, delta: f32) -> Vec2 {
    Vec2::new(
        vel.x - spin * vel.y * ACC * delta,
        vel.y + spin * vel.x * ACC * delta,
    )
}

fn is_sharp_deflection(before: Vec2, after: Vec2) -> bool {
    let before = before.normalize();
    let after = after.normalize();
    if before == Vec2::ZERO || after == Vec2::ZERO {
        return false;
    }
    before.dot(after) < SHARP_DEFLECTION_COS
}
