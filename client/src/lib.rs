//! # PingBong Client Library
//!
//! Client-side core of the circular-arena pong game: everything between the
//! WebSocket and the screen. The server is authoritative; this crate keeps a
//! local copy of the match running at full frame rate and bends it back
//! towards the server's view whenever an update arrives.
//!
//! ## Architecture Overview
//!
//! ### Client-Side Prediction
//! Pointer input moves the local paddle immediately. Every step is remembered
//! under the sequence number it is sent with, so nothing waits for the server.
//!
//! ### Server Reconciliation
//! Each sync carries the last sequence the server applied to the local
//! player. The paddle is reset to the server position and every newer step is
//! replayed on top of it.
//!
//! ### Interpolation
//! Remote paddles are rendered slightly in the past, between the two buffered
//! server positions that bracket the render time.
//!
//! ### Physics Sync
//! Balls are simulated locally and checked against every server update.
//! Small drift is blended away; large drift snaps to the server state. Right
//! after the local paddle hits a ball, server updates for it are ignored for
//! one round trip, since they predate the hit.
//!
//! ## Module Organization
//!
//! - `geometry`: 2D vectors and segment intersection
//! - `paddle`: paddles, team arcs, collision quads, remote interpolation buffer
//! - `ball`: ball physics, collision response and sync correction
//! - `prediction`: local input history, reconciliation and move packets
//! - `scoreboard`: team scores and the local scoring streak
//! - `game`: the match itself, its timer and the per-frame view for rendering
//! - `sync`: applying server syncs to a match
//! - `session`: login, lobby and room state around matches
//! - `network`: the WebSocket driver
//! - `input`: pointer input and the built-in auto pilot
//! - `clock`, `config`, `error`, `events`: time sources, tuning, errors, match events
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::clock::SystemClock;
//! use client::config::Tuning;
//! use client::events::LogSink;
//! use client::session::Session;
//!
//! # fn main() -> Result<(), client::error::ClientError> {
//! // Any Transport works; a Vec just collects the outgoing packets.
//! let outgoing: Vec<Vec<u8>> = Vec::new();
//! let mut session = Session::new(outgoing, SystemClock::new(), "player", Tuning::default());
//! session.login()?;
//!
//! let mut events = LogSink;
//! # let packet: Vec<u8> = vec![0];
//! // For every packet from the server:
//! session.handle_packet(&packet, &mut events)?;
//! // Once per frame, with the pointer angle:
//! session.tick(0.0, &mut events)?;
//! # Ok(())
//! # }
//! ```

pub mod ball;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod geometry;
pub mod input;
pub mod network;
pub mod paddle;
pub mod prediction;
pub mod scoreboard;
pub mod session;
pub mod sync;
