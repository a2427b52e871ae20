//! Client-side prediction of the local paddle
//!
//! Input is applied to the local paddle immediately and remembered together
//! with the sequence number it will be sent under. When the server reports the
//! last sequence it processed, the paddle is reset to the server position and
//! every newer input is replayed on top of it.

use crate::config::Tuning;
use crate::paddle::{Paddle, TeamBounds};
use log::{debug, trace};
use shared::protocol::MoveUpdate;
use shared::{repeat, SeqNr, NO_TEAM, TAU};
use std::collections::VecDeque;
use std::f32::consts::PI;

/// Steps smaller than this are treated as no movement.
const MOVE_EPSILON: f32 = 0.0001;

/// Locally applied movement the server has not acknowledged yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingInput {
    pub delta: f32,
    pub sequence: SeqNr,
}

/// Signed step from the paddle towards the pointer angle, taking the shorter way around.
///
/// `target` is in screen space, so the field `rotation` is removed first.
/// The result is limited to `max_move` and then scaled by `speed_factor`.
pub fn steering_step(
    target: f32,
    paddle: &Paddle,
    rotation: f32,
    max_move: f32,
    speed_factor: f32,
) -> f32 {
    let mut diff = repeat(target - paddle.w_angle / 2.0 - paddle.pos - rotation, TAU);
    if diff > PI {
        diff -= TAU;
    }
    diff.clamp(-max_move, max_move) * speed_factor
}

#[derive(Debug, Clone)]
pub struct PredictionEngine {
    pending: VecDeque<PendingInput>,
    accumulated_delta: f32,
    accumulated_frames: u32,
    hit_ball: Option<u8>,
    last_sent: Option<SeqNr>,
    move_accumulation: u32,
    max_move: f32,
}

impl PredictionEngine {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pending: VecDeque::new(),
            accumulated_delta: 0.0,
            accumulated_frames: 0,
            hit_ball: None,
            last_sent: None,
            move_accumulation: tuning.move_accumulation.max(1),
            max_move: tuning.max_move,
        }
    }

    pub fn pending(&self) -> &VecDeque<PendingInput> {
        &self.pending
    }

    pub fn accumulated_delta(&self) -> f32 {
        self.accumulated_delta
    }

    /// Sequence number of the last move packet produced.
    pub fn last_sent(&self) -> Option<SeqNr> {
        self.last_sent
    }

    /// Moves the local paddle towards `target` and records the step.
    ///
    /// Returns the applied delta, or `None` if the paddle did not move.
    pub fn steer(
        &mut self,
        paddle: &mut Paddle,
        bounds: TeamBounds,
        target: f32,
        rotation: f32,
        speed_factor: f32,
        sequence: SeqNr,
    ) -> Option<f32> {
        let step = steering_step(target, paddle, rotation, self.max_move, speed_factor);
        if step.abs() <= MOVE_EPSILON {
            return None;
        }

        let old_pos = paddle.pos;
        paddle.move_to(bounds.clamp(old_pos + step));
        if (paddle.pos - old_pos).abs() <= MOVE_EPSILON {
            return None;
        }

        self.record(step, sequence);
        Some(step)
    }

    /// Remembers an applied step for replay and for the next move packet.
    ///
    /// Sequence numbers in the history strictly increase: steps taken after a
    /// packet went out are tagged past that packet's sequence, and a step sharing
    /// the newest entry's sequence is folded into it.
    pub fn record(&mut self, delta: f32, sequence: SeqNr) {
        let sequence = match self.last_sent {
            Some(last) if sequence <= last => last + 1,
            _ => sequence,
        };

        match self.pending.back_mut() {
            Some(newest) if sequence <= newest.sequence => newest.delta += delta,
            _ => self.pending.push_back(PendingInput { delta, sequence }),
        }
        self.accumulated_delta += delta;
    }

    /// Drops inputs the server has applied (sequence `<= ack`) and replays the
    /// rest on top of the paddle's current (authoritative) position.
    pub fn reconcile(&mut self, paddle: &mut Paddle, bounds: TeamBounds, ack: SeqNr) {
        while self.pending.front().is_some_and(|input| input.sequence <= ack) {
            self.pending.pop_front();
        }

        for input in &self.pending {
            paddle.move_to(bounds.clamp(paddle.pos + input.delta));
        }

        trace!(
            "Reconciled to ack {}, replayed {} input(s), pos {:.4}",
            ack,
            self.pending.len(),
            paddle.pos
        );
    }

    /// Snaps the paddle to the server position and reconciles.
    pub fn apply_authoritative(
        &mut self,
        paddle: &mut Paddle,
        bounds: TeamBounds,
        server_pos: f32,
        ack: SeqNr,
    ) {
        paddle.move_to(server_pos);
        self.reconcile(paddle, bounds, ack);
    }

    /// The local paddle hit ball `index`; report it with the next packet.
    pub fn note_ball_hit(&mut self, index: u8) {
        self.hit_ball = Some(index);
        self.accumulated_frames = self.move_accumulation;
    }

    /// Finishes a tick. Returns the move packet to send, if one is due.
    ///
    /// A packet goes out every `move_accumulation` ticks when there is movement
    /// or a hit to report. It is held back while `sequence` has not advanced
    /// past the previous packet, because the server drops non-increasing sequences.
    pub fn end_tick(&mut self, sequence: SeqNr, spin: f32) -> Option<MoveUpdate> {
        self.accumulated_frames += 1;
        if self.accumulated_frames < self.move_accumulation {
            return None;
        }

        if self.accumulated_delta == 0.0 && self.hit_ball.is_none() {
            self.accumulated_frames = 0;
            return None;
        }

        if self.last_sent.is_some_and(|last| sequence <= last) {
            debug!("Move packet held back, sequence {} already sent", sequence);
            return None;
        }

        let update = MoveUpdate {
            delta: self.accumulated_delta,
            seq_nr: sequence,
            ball_hit: self.hit_ball.take().unwrap_or(NO_TEAM),
            spin,
        };

        self.accumulated_delta = 0.0;
        self.accumulated_frames = 0;
        self.last_sent = Some(sequence);
        Some(update)
    }
}
