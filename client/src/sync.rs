//! Routing of authoritative sync packets into the match state

use crate::ball::LONG_RALLY_HITS;
use crate::clock::ClockSync;
use crate::error::ClientError;
use crate::events::{EventSink, MatchEvent};
use crate::game::{Match, VisiblePowerUp, ROTATE_FIELD_SPEED};
use crate::scoreboard::{COMBO_MILESTONE, POWERUP_BONUS_POINTS};
use log::{debug, trace};
use shared::protocol::{BallSync, PlayerSync, PowerUpEvent, SyncMessage, BALL_FLAG_SCORED};
use shared::{FRAMES_PER_MS, NO_TEAM};

/// Power-up types 2 through 6, one bit each.
const ALL_POWER_UPS: u32 = (1 << 2) | (1 << 3) | (1 << 4) | (1 << 5) | (1 << 6);

impl Match {
    /// Applies one server sync.
    ///
    /// Ball states are projected forward by how far the local clock runs ahead
    /// of the server frame (minus the expected lead). When the server turns
    /// out to be ahead instead, the match start time is moved back so later
    /// sequence numbers and frame counts catch up.
    pub fn apply_sync(
        &mut self,
        sync: &SyncMessage,
        now: f64,
        clock: &ClockSync,
        events: &mut dyn EventSink,
    ) -> Result<(), ClientError> {
        let local_frame = (now - self.start_time) * FRAMES_PER_MS;
        let difference =
            local_frame - sync.frame_nr as f64 - clock.initial_delay() * FRAMES_PER_MS;
        let delta_frame = difference.max(0.0) as f32;
        trace!(
            "Sync for frame {:.1} at local frame {:.1}",
            sync.frame_nr,
            local_frame
        );

        self.sync_players(&sync.players, now)?;
        self.sync_balls(&sync.balls, delta_frame, events)?;
        self.apply_power_up(sync.power_up, events);

        if difference < 0.0 {
            let shift = difference / FRAMES_PER_MS;
            debug!("Server ahead of local clock, start time moved by {:.1}ms", shift);
            self.start_time += shift;
        }

        Ok(())
    }

    fn sync_players(&mut self, players: &[PlayerSync], now: f64) -> Result<(), ClientError> {
        for update in players {
            let paddle = self
                .paddles
                .get_mut(&update.client_id)
                .ok_or(ClientError::RosterInconsistency(update.client_id))?;

            if update.client_id == self.local_id {
                self.prediction
                    .apply_authoritative(paddle, self.bounds, update.pos, update.seq_nr);
            } else {
                paddle.buffer_move(update.pos, now);
            }
        }
        Ok(())
    }

    fn sync_balls(
        &mut self,
        balls: &[BallSync],
        delta_frame: f32,
        events: &mut dyn EventSink,
    ) -> Result<(), ClientError> {
        for update in balls {
            let ball = self
                .balls
                .get_mut(update.ball_id as usize)
                .ok_or(ClientError::UnknownBall(update.ball_id))?;

            let mut hit_team = update.hit_pair.hit_team();
            if update.flags == BALL_FLAG_SCORED && hit_team != NO_TEAM {
                let receiving_team = update.hit_pair.receiving_team();
                let outcome =
                    self.scoreboard
                        .record_goal(hit_team, receiving_team, update.rallies);

                events.notify(MatchEvent::Goal {
                    scoring_team: hit_team,
                    receiving_team,
                    points: update.rallies as u32,
                    own_goal: outcome.own_goal,
                    by_local_team: outcome.own_goal && hit_team == self.local_team,
                    x: ball.pos.x,
                    y: ball.pos.y,
                });
                if outcome.combo_milestone {
                    events.notify(MatchEvent::ScoringCombo(COMBO_MILESTONE));
                }
                hit_team = NO_TEAM;
            }

            let report = ball.sync(
                delta_frame,
                &update.state,
                hit_team,
                update.flags,
                update.rallies,
                self.tuning.sync_tolerance_ticks,
            );

            if report.sharp_hit {
                events.notify(MatchEvent::BallHit {
                    ball: update.ball_id,
                    team: hit_team,
                    x: ball.pos.x,
                    y: ball.pos.y,
                });
            }
            if report.long_rally {
                events.notify(MatchEvent::LongRally {
                    ball: update.ball_id,
                    hits: LONG_RALLY_HITS,
                });
            }
        }
        Ok(())
    }

    fn apply_power_up(&mut self, event: PowerUpEvent, events: &mut dyn EventSink) {
        let team = match event {
            PowerUpEvent::None => return,
            PowerUpEvent::Spawn { x, y, kind } => {
                debug!("Power-up {} spawned at ({:.0}, {:.0})", kind, x, y);
                self.power_up = Some(VisiblePowerUp { x, y, kind });
                events.notify(MatchEvent::PowerUpSpawned { x, y, kind });
                return;
            }
            PowerUpEvent::ResizePlayers { team, .. }
            | PowerUpEvent::BonusPoints { team }
            | PowerUpEvent::SplitRgb { team }
            | PowerUpEvent::RotateField { team }
            | PowerUpEvent::SlowDown { team, .. }
            | PowerUpEvent::Other { team, .. } => team,
        };

        let packet_type = event.packet_type();
        self.power_up = None;
        if team == self.local_team {
            self.track_collected(packet_type, events);
        }
        events.notify(MatchEvent::PowerUpTaken { team, packet_type });

        let hits_others = team != self.local_team;
        match event {
            PowerUpEvent::ResizePlayers { rebalance, .. } => {
                self.effects.meter_visible = !self.effects.meter_visible;
                self.apply_resizing(team, rebalance);
            }
            PowerUpEvent::BonusPoints { .. } => {
                self.scoreboard.add_points(team, POWERUP_BONUS_POINTS);
            }
            PowerUpEvent::SplitRgb { .. } => {
                self.effects.meter_visible = !self.effects.meter_visible;
                if hits_others {
                    self.effects.split_colors = self.effects.meter_visible;
                }
            }
            PowerUpEvent::RotateField { .. } => {
                self.effects.meter_visible = !self.effects.meter_visible;
                if hits_others {
                    self.effects.rotation_speed = if self.effects.meter_visible {
                        ROTATE_FIELD_SPEED
                    } else {
                        0.0
                    };
                }
            }
            PowerUpEvent::SlowDown { factor, .. } => {
                self.effects.meter_visible = !self.effects.meter_visible;
                if hits_others {
                    self.effects.speed_factor = factor;
                }
            }
            PowerUpEvent::Other { packet_type, .. } => {
                debug!("Unhandled power-up type {}", packet_type);
            }
            PowerUpEvent::None | PowerUpEvent::Spawn { .. } => {}
        }
    }

    fn track_collected(&mut self, packet_type: u8, events: &mut dyn EventSink) {
        if self.all_power_ups_reported || !(2..=6).contains(&packet_type) {
            return;
        }
        self.power_ups_collected |= 1 << packet_type;
        if self.power_ups_collected == ALL_POWER_UPS {
            self.all_power_ups_reported = true;
            events.notify(MatchEvent::AllPowerUpsCollected);
        }
    }
}
