pub mod codec;
pub mod protocol;

pub use codec::{DecodeError, DecodeResult, PacketDecoder, PacketEncoder};
pub use protocol::{ClientId, SeqNr, ServerMessage};

pub const PROTOCOL_VERSION: u32 = 9;

/// Server ticks per second.
pub const TPS: u32 = 20;
/// Milliseconds between two server ticks.
pub const TIME_DELAY_MS: f64 = 1000.0 / TPS as f64;
/// Simulation frames per server tick.
pub const TPF: f32 = 60.0 / TPS as f32;
/// Conversion from wall-clock milliseconds to simulation frames (60 per second).
pub const FRAMES_PER_MS: f64 = 0.06;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 800.0;
pub const CIRCLE_RADIUS: f32 = 300.0;
pub const BALL_RADIUS: f32 = 8.0;
/// `atan(BALL_RADIUS / CIRCLE_RADIUS)`: angular half-size of a ball on the arena rim.
pub const BALL_RADIUS_ANGLE: f32 = 0.026_660_348;
/// Visual padding of a paddle.
pub const W_PADDING: f32 = 4.0;
pub const LINE_WIDTH: f32 = 10.0;

/// Team sentinel used for "nobody hit this ball yet" and "no ball hit" in move packets.
pub const NO_TEAM: u8 = 0b1111;

pub const TAU: f32 = std::f32::consts::TAU;

/// Centre of the arena in field coordinates.
pub fn arena_center() -> (f32, f32) {
    (FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0)
}

/// Wraps `t` into `[0, length]`.
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Bounds `[min_pos, max_pos]` of a paddle of angular width `w_angle` on team `team_nr`.
pub fn team_bounds(team_nr: u8, team_count: u8, w_angle: f32) -> (f32, f32) {
    let angle = TAU / team_count.max(1) as f32;
    let min_pos = angle * team_nr as f32;
    (min_pos, min_pos + angle - w_angle)
}
