//! Tunable constants of the prediction and synchronization code

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs that trade smoothness for responsiveness. Defaults match the live server.
///
/// Loaded from JSON; missing fields keep their default:
///
/// ```json
/// { "move_accumulation": 3, "remote_render_delay_ms": 80.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Multiple of one server tick's travel a ball may drift before it is snapped.
    pub sync_tolerance_ticks: f32,
    /// Ticks between two move packets.
    pub move_accumulation: u32,
    /// Largest paddle step per tick, in radians.
    pub max_move: f32,
    /// How far behind real time remote paddles are rendered.
    pub remote_render_delay_ms: f64,
    pub max_initial_delay_ms: f64,
    /// Weight of a new sample in the smoothed round-trip time.
    pub rtt_smoothing: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sync_tolerance_ticks: 2.0,
            move_accumulation: 2,
            max_move: std::f32::consts::PI / 20.0,
            remote_render_delay_ms: shared::TIME_DELAY_MS,
            max_initial_delay_ms: 200.0,
            rtt_smoothing: 1.0 / 8.0,
        }
    }
}

impl Tuning {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        let tuning: Tuning =
            serde_json::from_str(text).map_err(|e| ClientError::Config(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.move_accumulation == 0 {
            return Err(ClientError::Config(
                "move_accumulation must be at least 1".to_string(),
            ));
        }
        if !(self.rtt_smoothing > 0.0 && self.rtt_smoothing <= 1.0) {
            return Err(ClientError::Config(format!(
                "rtt_smoothing {} outside (0, 1]",
                self.rtt_smoothing
            )));
        }
        if self.max_move <= 0.0 || self.sync_tolerance_ticks <= 0.0 {
            return Err(ClientError::Config(
                "max_move and sync_tolerance_ticks must be positive".to_string(),
            ));
        }
        if self.remote_render_delay_ms < 0.0 || self.max_initial_delay_ms < 0.0 {
            return Err(ClientError::Config("delays cannot be negative".to_string()));
        }
        Ok(())
    }
}
