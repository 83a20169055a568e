//! Tracker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Thresholds and buffer sizes, fixed when the tracker is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum index-tip confidence to accept the hand.
    pub index_confidence_min: f64,
    /// Minimum thumb-tip confidence to accept the hand.
    pub thumb_confidence_min: f64,
    /// Maximum index/thumb distance (normalized units) that counts as a pinch.
    pub pinch_distance_max: f64,
    /// Number of recent positions averaged by the smoother.
    pub smoothing_window_capacity: usize,
    /// Stroke appearance handed to renderers.
    pub style: StrokeStyle,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            index_confidence_min: 0.8,
            thumb_confidence_min: 0.5,
            pinch_distance_max: 0.05,
            smoothing_window_capacity: 5,
            style: StrokeStyle::default(),
        }
    }
}

impl TrackerConfig {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), TrackerError> {
        check_confidence("index_confidence_min", self.index_confidence_min)?;
        check_confidence("thumb_confidence_min", self.thumb_confidence_min)?;

        if !self.pinch_distance_max.is_finite() || self.pinch_distance_max < 0.0 {
            return Err(TrackerError::Configuration(format!(
                "pinch_distance_max must be finite and >= 0, got {}",
                self.pinch_distance_max
            )));
        }
        if self.smoothing_window_capacity == 0 {
            return Err(TrackerError::Configuration(
                "smoothing_window_capacity must be positive".to_string(),
            ));
        }
        self.style.validate()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Configuration(format!("Failed to read {:?}: {}", path, e))
        })?;
        log::info!("Loaded tracker config from {:?}", path);
        Self::from_json(&json)
    }
}

fn check_confidence(name: &str, value: f64) -> Result<(), TrackerError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackerError::Configuration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// Stroke appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    /// RGBA color (0.0 - 1.0)
    pub color: [f32; 4],
    /// Line width in view units
    pub line_width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: [0.0, 1.0, 1.0, 1.0], // Cyan
            line_width: 3.0,
        }
    }
}

impl StrokeStyle {
    fn validate(&self) -> Result<(), TrackerError> {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(TrackerError::Configuration(format!(
                "line_width must be positive, got {}",
                self.line_width
            )));
        }
        if self.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(TrackerError::Configuration(format!(
                "color components must be within [0, 1], got {:?}",
                self.color
            )));
        }
        Ok(())
    }
}
