//! Match state: balls, paddles, scores and power-up effects between match start and reset
//!
//! A [`Match`] is advanced by [`Match::tick`] once per rendered frame and
//! corrected by [`Match::apply_sync`](crate::sync) whenever the server sends
//! an update. Dropping it ends the match.

use crate::ball::{Ball, SpinMode};
use crate::clock::ClockSync;
use crate::config::Tuning;
use crate::error::ClientError;
use crate::events::{EventSink, MatchEvent};
use crate::paddle::{Paddle, TeamBounds};
use crate::prediction::PredictionEngine;
use crate::scoreboard::Scoreboard;
use log::{debug, info, warn};
use shared::protocol::{LeaveMessage, MoveUpdate, RebalanceTeam, RoomPlayer, StartMessage};
use shared::{ClientId, SeqNr, FRAMES_PER_MS, TAU};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;

/// Seconds between match start and the first ball movement.
pub const TIME_WAIT_BEFORE_START: f64 = 3.0;
/// Field rotation per frame while another team's rotate effect is active.
pub const ROTATE_FIELD_SPEED: f32 = 0.01;

/// Sequence number the server expects for input applied `ms_since_start` into the match.
pub fn sequence_number(ms_since_start: f64, initial_delay: f64) -> SeqNr {
    ((ms_since_start - initial_delay) * FRAMES_PER_MS)
        .floor()
        .max(0.0) as SeqNr
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Countdown { seconds_left: u32 },
    Running { seconds_left: u32 },
    Over,
}

impl MatchPhase {
    pub fn timer_text(&self) -> String {
        match self {
            MatchPhase::Countdown { seconds_left } => format!("Starting in {}", seconds_left),
            MatchPhase::Running { seconds_left } => {
                format!("{:02}:{:02}", seconds_left / 60, seconds_left % 60)
            }
            MatchPhase::Over => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePowerUp {
    pub x: f32,
    pub y: f32,
    pub kind: u8,
}

/// Power-up side effects currently applied to the local view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    /// An effect with a duration is running.
    pub meter_visible: bool,
    pub split_colors: bool,
    pub rotation_speed: f32,
    /// Multiplier on the local paddle's steering.
    pub speed_factor: f32,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            meter_visible: false,
            split_colors: false,
            rotation_speed: 0.0,
            speed_factor: 1.0,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub balls: &'a [Ball],
    pub paddles: &'a BTreeMap<ClientId, Paddle>,
    pub local_id: ClientId,
    pub rotation: f32,
    pub scores: &'a [u32],
    pub phase: MatchPhase,
    pub power_up: Option<VisiblePowerUp>,
    pub effects: Effects,
}

/// Draws frames. The headless client only logs them.
pub trait RenderSurface {
    fn present(&mut self, frame: &FrameView<'_>);
}

#[derive(Debug, Clone)]
pub struct Match {
    pub(crate) local_id: ClientId,
    pub(crate) local_team: u8,
    team_count: u8,
    /// Match length in seconds, countdown excluded.
    match_time: f32,
    pub(crate) start_time: f64,
    prev_tick: Option<f64>,
    pub(crate) bounds: TeamBounds,
    rotation: f32,
    pub(crate) effects: Effects,
    pub(crate) paddles: BTreeMap<ClientId, Paddle>,
    pub(crate) balls: Vec<Ball>,
    pub(crate) scoreboard: Scoreboard,
    pub(crate) prediction: PredictionEngine,
    pub(crate) power_up: Option<VisiblePowerUp>,
    pub(crate) power_ups_collected: u32,
    pub(crate) all_power_ups_reported: bool,
    pub(crate) tuning: Tuning,
    phase: MatchPhase,
}

impl Match {
    /// Builds the match from the start payload. `roster` supplies the names of
    /// the other players; the local player must be part of `start`.
    pub fn new(
        local_id: ClientId,
        local_name: &str,
        roster: &[RoomPlayer],
        start: &StartMessage,
        now: f64,
        clock: &ClockSync,
        tuning: &Tuning,
    ) -> Result<Self, ClientError> {
        let me = start
            .players
            .iter()
            .find(|p| p.client_id == local_id)
            .ok_or(ClientError::RosterInconsistency(local_id))?;

        let team_count = start.team_count.max(1);
        let angle = TAU / team_count as f32;

        let mut paddles = BTreeMap::new();
        paddles.insert(
            local_id,
            Paddle::local(me.pos, me.w_angle, me.team_nr, local_name.to_string()),
        );
        for player in start.players.iter().filter(|p| p.client_id != local_id) {
            let name = roster
                .iter()
                .find(|r| r.client_id == player.client_id)
                .map(|r| r.name.clone())
                .unwrap_or_default();
            paddles.insert(
                player.client_id,
                Paddle::remote(
                    player.pos,
                    player.w_angle,
                    player.team_nr,
                    name,
                    tuning.remote_render_delay_ms,
                ),
            );
        }

        let mode = SpinMode::from_setting(start.spin_towards_center);
        let balls: Vec<Ball> = start.balls.iter().map(|s| Ball::new(s, mode)).collect();

        info!(
            "Match started: {} teams, {} players, {} balls, {}s, on team {}",
            team_count,
            paddles.len(),
            balls.len(),
            start.match_time,
            me.team_nr
        );

        Ok(Self {
            local_id,
            local_team: me.team_nr,
            team_count,
            match_time: start.match_time,
            start_time: now - clock.initial_delay(),
            prev_tick: None,
            bounds: TeamBounds::for_team(me.team_nr, team_count, me.w_angle),
            rotation: FRAC_PI_2 - me.team_nr as f32 * angle - angle / 2.0,
            effects: Effects::default(),
            paddles,
            balls,
            scoreboard: Scoreboard::new(team_count, me.team_nr),
            prediction: PredictionEngine::new(tuning),
            power_up: None,
            power_ups_collected: 0,
            all_power_ups_reported: false,
            tuning: *tuning,
            phase: MatchPhase::Countdown {
                seconds_left: TIME_WAIT_BEFORE_START as u32,
            },
        })
    }

    pub fn local_id(&self) -> ClientId {
        self.local_id
    }

    pub fn local_team(&self) -> u8 {
        self.local_team
    }

    pub fn team_count(&self) -> u8 {
        self.team_count
    }

    pub fn local_paddle(&self) -> Option<&Paddle> {
        self.paddles.get(&self.local_id)
    }

    pub fn paddles(&self) -> &BTreeMap<ClientId, Paddle> {
        &self.paddles
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn prediction(&self) -> &PredictionEngine {
        &self.prediction
    }

    pub fn bounds(&self) -> TeamBounds {
        self.bounds
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn effects(&self) -> Effects {
        self.effects
    }

    pub fn power_up(&self) -> Option<VisiblePowerUp> {
        self.power_up
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Runs one frame. `target` is the pointer angle in screen space.
    ///
    /// Returns the move packet to send, if one is due.
    pub fn tick(
        &mut self,
        now: f64,
        target: f32,
        clock: &ClockSync,
        events: &mut dyn EventSink,
    ) -> Option<MoveUpdate> {
        let ms_since_start = now - self.start_time;
        let seconds_since_start = (ms_since_start / 1000.0).floor();

        let mut delta = match self.prev_tick.replace(now) {
            Some(prev) => ((now - prev) * FRAMES_PER_MS) as f32,
            None => 0.0,
        };
        let mut ball_delta = delta;

        if seconds_since_start < TIME_WAIT_BEFORE_START {
            delta = 0.0;
            ball_delta = 0.0;
            self.phase = MatchPhase::Countdown {
                seconds_left: (TIME_WAIT_BEFORE_START - seconds_since_start) as u32,
            };
        } else {
            let remaining =
                self.match_time as f64 - seconds_since_start + TIME_WAIT_BEFORE_START;
            if remaining <= 0.0 || self.phase == MatchPhase::Over {
                ball_delta = 0.0;
                self.finish(events);
            } else {
                self.phase = MatchPhase::Running {
                    seconds_left: remaining as u32,
                };
            }
        }

        if self.effects.rotation_speed > 0.0 {
            self.rotation += self.effects.rotation_speed * delta;
        }

        let sequence = sequence_number(ms_since_start, clock.initial_delay());
        let local_id = self.local_id;

        if let Some(paddle) = self.paddles.get_mut(&local_id) {
            self.prediction.steer(
                paddle,
                self.bounds,
                target,
                self.rotation,
                self.effects.speed_factor,
                sequence,
            );
        }

        for paddle in self.paddles.values_mut() {
            paddle.tick(now);
        }

        let suppression = clock.sync_suppression_frames();
        for (index, ball) in self.balls.iter_mut().enumerate() {
            let Some(hit) = ball.tick(ball_delta, &self.paddles, suppression) else {
                continue;
            };
            if hit.sharp {
                events.notify(MatchEvent::BallHit {
                    ball: index as u8,
                    team: hit.team,
                    x: ball.pos.x,
                    y: ball.pos.y,
                });
            }
            if hit.paddle == local_id {
                debug!("Local paddle hit ball {}", index);
                self.prediction.note_ball_hit(index as u8);
            }
        }

        let spin = self.paddles.get(&local_id).map_or(0.0, |p| p.spin);
        self.prediction.end_tick(sequence, spin)
    }

    fn finish(&mut self, events: &mut dyn EventSink) {
        if self.phase == MatchPhase::Over {
            return;
        }
        self.phase = MatchPhase::Over;

        let standings = self.scoreboard.standings();
        info!("Match over, scores {:?}", self.scoreboard.scores());
        events.notify(MatchEvent::MatchOver {
            standings,
            local_team: self.local_team,
            local_id: self.local_id,
            roster_size: self.paddles.len(),
        });
    }

    /// Removes a departed player and applies the server's rebalance to its team.
    ///
    /// A leave for a player the match does not know is a roster inconsistency.
    pub fn apply_leave(&mut self, leave: &LeaveMessage) -> Result<(), ClientError> {
        if leave.left_client_id == self.local_id {
            warn!("Server reported the local player leaving, ignored");
            return Ok(());
        }

        let paddle = self
            .paddles
            .remove(&leave.left_client_id)
            .ok_or(ClientError::RosterInconsistency(leave.left_client_id))?;

        info!("{} left the match", paddle.name);
        if let Some(rebalance) = leave.rebalance {
            self.apply_resizing(paddle.team_nr, rebalance);
        }
        Ok(())
    }

    /// Resizes every paddle of `team`; moves the local bounds if it is the local team.
    pub fn apply_resizing(&mut self, team: u8, rebalance: RebalanceTeam) {
        for paddle in self.paddles.values_mut().filter(|p| p.team_nr == team) {
            paddle.rebalance(rebalance.min_pos, rebalance.max_pos, rebalance.w_angle);
        }
        if team == self.local_team {
            self.bounds = rebalance.into();
        }
    }

    pub fn frame(&self) -> FrameView<'_> {
        FrameView {
            balls: &self.balls,
            paddles: &self.paddles,
            local_id: self.local_id,
            rotation: self.rotation,
            scores: self.scoreboard.scores(),
            phase: self.phase,
            power_up: self.power_up,
            effects: self.effects,
        }
    }
}
