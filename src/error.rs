//! Error types for the tracker.

use thiserror::Error;

use crate::landmarks::HandJoint;

/// Errors surfaced by the tracker.
///
/// `InvalidLandmark` is recovered per frame; `Configuration` is only raised
/// while building a tracker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("Invalid landmark {joint:?}: {reason}")]
    InvalidLandmark { joint: HandJoint, reason: String },
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl TrackerError {
    pub(crate) fn invalid_landmark(joint: HandJoint, reason: impl Into<String>) -> Self {
        Self::InvalidLandmark {
            joint,
            reason: reason.into(),
        }
    }

    /// Whether the error only affects a single frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidLandmark { .. })
    }
}
