//! Performance benchmarks for the per-frame and per-packet hot paths

use client::ball::{Ball, SpinMode};
use client::clock::ClockSync;
use client::config::Tuning;
use client::events::MatchEvent;
use client::game::Match;
use client::geometry::{segment_intersection, Vec2};
use client::paddle::{Paddle, TeamBounds};
use client::prediction::PredictionEngine;
use shared::codec::PacketEncoder;
use shared::protocol::{recv, BallState, HitPair, MoveUpdate, StartMessage, StartPlayer};
use shared::{ServerMessage, NO_TEAM, TAU};
use std::collections::BTreeMap;
use std::time::Instant;

/// Eight paddles spread over four teams.
fn paddles() -> BTreeMap<u32, Paddle> {
    (0..8u32)
        .map(|id| {
            let team = (id / 2) as u8;
            let pos = team as f32 * TAU / 4.0 + (id % 2) as f32 * 0.6;
            (id, Paddle::local(pos, 0.4, team, format!("p{}", id)))
        })
        .collect()
}

fn ball_state(i: usize) -> BallState {
    let angle = i as f32 * 1.3;
    BallState {
        x: 400.0,
        y: 400.0,
        dx: angle.cos() * 4.0,
        dy: angle.sin() * 4.0,
        spin: 0.01,
    }
}

fn sync_packet(players: u32, balls: u8) -> Vec<u8> {
    let mut encoder = PacketEncoder::new(recv::SYNC);
    encoder.put_f32(1234.0);
    encoder.put_u8(players as u8);
    for id in 0..players {
        encoder.put_varint(id).put_f32(1.0).put_varint(70_000 + id);
    }
    encoder.put_u8(balls);
    for id in 0..balls {
        encoder
            .put_u8((id << 4) | 2)
            .put_u8(HitPair::new(1, NO_TEAM).0)
            .put_u8(0);
        for value in [400.0f32, 400.0, 1.0, -1.0, 0.02] {
            encoder.put_f32(value);
        }
    }
    encoder.put_u8(0);
    encoder.finish()
}

/// Benchmarks sync packet decoding
#[test]
fn benchmark_sync_decoding() {
    let packet = sync_packet(8, 4);

    let iterations = 50_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let message = ServerMessage::decode(&packet).unwrap();
        assert!(matches!(message, ServerMessage::Sync(_)));
    }

    let duration = start.elapsed();
    println!(
        "Sync decoding: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks ball physics against a full roster
#[test]
fn benchmark_ball_tick() {
    let paddles = paddles();
    let mut balls: Vec<Ball> = (0..4)
        .map(|i| Ball::new(&ball_state(i), SpinMode::TowardsCenter))
        .collect();

    let frames = 10_000;
    let start = Instant::now();

    for frame in 0..frames {
        for (i, ball) in balls.iter_mut().enumerate() {
            ball.tick(1.0, &paddles, 8);
            if frame % 100 == 0 {
                *ball = Ball::new(&ball_state(i + frame), SpinMode::TowardsCenter);
            }
        }
    }

    let duration = start.elapsed();
    println!(
        "Ball physics: {} balls × {} frames in {:?} ({:.2} μs/frame)",
        balls.len(),
        frames,
        duration,
        duration.as_micros() as f64 / frames as f64
    );

    // Should complete in under 3 seconds
    assert!(duration.as_millis() < 3000);
}

/// Benchmarks input recording and reconciliation with a full history
#[test]
fn benchmark_reconciliation() {
    let mut engine = PredictionEngine::new(&Tuning::default());
    let mut paddle = Paddle::local(1.0, 0.4, 0, String::new());
    let bounds = TeamBounds::new(0.0, TAU / 2.0 - 0.4);

    let iterations = 20_000u32;
    let start = Instant::now();

    for sequence in 0..iterations {
        let delta = if sequence % 2 == 0 { 0.01 } else { -0.01 };
        engine.record(delta, sequence);
        if sequence >= 12 {
            engine.apply_authoritative(&mut paddle, bounds, 1.0, sequence - 12);
        }
    }

    let duration = start.elapsed();
    println!(
        "Reconciliation: {} inputs in {:?} ({:.2} μs/input)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(engine.pending().len() <= 12);
    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks whole match frames including steering and move packets
#[test]
fn benchmark_match_tick() {
    let start_message = StartMessage {
        team_count: 4,
        spin_towards_center: true,
        match_time: 300.0,
        players: (0..8u32)
            .map(|id| StartPlayer {
                client_id: id,
                team_nr: (id / 2) as u8,
                pos: (id / 2) as f32 * TAU / 4.0 + (id % 2) as f32 * 0.6,
                w_angle: 0.4,
            })
            .collect(),
        balls: (0..4).map(ball_state).collect(),
    };
    let clock = ClockSync::default();
    let mut game = Match::new(0, "bench", &[], &start_message, 0.0, &clock, &Tuning::default())
        .unwrap();
    let mut events: Vec<MatchEvent> = Vec::new();

    let frames = 5_000;
    let start = Instant::now();
    let mut packets = 0;

    for frame in 0..frames {
        let now = 3000.0 + frame as f64 * 16.0;
        let target = (frame as f32 * 0.01).sin() + game.rotation();
        if let Some(update) = game.tick(now, target, &clock, &mut events) {
            assert_eq!(update.encode().len(), MoveUpdate::PACKET_LEN);
            packets += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Match frames: {} frames in {:?} ({:.2} μs/frame), {} move packets",
        frames,
        duration,
        duration.as_micros() as f64 / frames as f64,
        packets
    );

    assert!(packets > 0);
    // Should complete in under 3 seconds
    assert!(duration.as_millis() < 3000);
}

/// Benchmarks the segment intersection used for collisions
#[test]
fn benchmark_segment_intersection() {
    let a = Vec2::new(100.0, 300.0);
    let b = Vec2::new(100.0, 500.0);

    let iterations = 200_000;
    let start = Instant::now();
    let mut hits = 0;

    for i in 0..iterations {
        let y = 300.0 + (i % 400) as f32;
        if segment_intersection(Vec2::new(110.0, y), Vec2::new(90.0, y), a, b).is_some() {
            hits += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Segment intersection: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(hits > 0);
    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
