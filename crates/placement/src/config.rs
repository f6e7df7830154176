//! Tunable placement parameters.
//!
//! Every timing and qualification constant the controller uses lives in the
//! [`PlacementParams`] resource so a test catalog or a JSON file can override
//! it without recompilation. Missing fields fall back to their defaults.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Default minimum gap between two accepted placements.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Default time a rejection message stays visible.
pub const DEFAULT_REJECTION_DISPLAY_MS: u64 = 3_000;
/// Default time a pending anchor creation may take before it is abandoned.
pub const DEFAULT_CREATION_TIMEOUT_MS: u64 = 2_000;
/// Smallest polygon a surface may report and still be placeable.
pub const MIN_POLYGON_VERTICES: usize = 3;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Taps closer than this to the last accepted placement are rejected.
    pub debounce_ms: u64,
    /// How long a rejection stays visible before it auto-clears.
    pub rejection_display_ms: u64,
    /// A pending creation older than this is abandoned.
    pub creation_timeout_ms: u64,
    /// Surfaces with fewer polygon vertices are degenerate.
    pub min_polygon_vertices: usize,
    /// Pixel intensity below this reads as "Low light".
    pub low_light_threshold: f32,
    /// Pixel intensity above this reads as "Bright light".
    pub bright_light_threshold: f32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            rejection_display_ms: DEFAULT_REJECTION_DISPLAY_MS,
            creation_timeout_ms: DEFAULT_CREATION_TIMEOUT_MS,
            min_polygon_vertices: MIN_POLYGON_VERTICES,
            low_light_threshold: 0.3,
            bright_light_threshold: 0.8,
        }
    }
}

impl PlacementParams {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rejection_display(&self) -> Duration {
        Duration::from_millis(self.rejection_display_ms)
    }

    pub fn creation_timeout(&self) -> Duration {
        Duration::from_millis(self.creation_timeout_ms)
    }

    /// Parse parameters from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and parse a JSON parameter file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.min_polygon_vertices < MIN_POLYGON_VERTICES {
            return Err(LoadError::Invalid(format!(
                "min_polygon_vertices must be at least {MIN_POLYGON_VERTICES}, got {}",
                self.min_polygon_vertices
            )));
        }
        if !(self.low_light_threshold.is_finite() && self.bright_light_threshold.is_finite()) {
            return Err(LoadError::Invalid(
                "light thresholds must be finite".to_string(),
            ));
        }
        if self.low_light_threshold > self.bright_light_threshold {
            return Err(LoadError::Invalid(format!(
                "low_light_threshold ({}) exceeds bright_light_threshold ({})",
                self.low_light_threshold, self.bright_light_threshold
            )));
        }
        if self.creation_timeout_ms == 0 {
            return Err(LoadError::Invalid(
                "creation_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
