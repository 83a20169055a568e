//! Hand landmark observations
//!
//! One [`HandObservation`] is produced per detected hand per frame by the
//! external detector. Coordinates are normalized to [0, 1] in detector space.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Number of joints in the standard hand layout
pub const JOINT_COUNT: usize = 21;

/// Named hand joints (21-point layout, wrist first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    LittleMcp,
    LittlePip,
    LittleDip,
    LittleTip,
}

impl HandJoint {
    /// All joints in detector index order.
    pub const ALL: [HandJoint; JOINT_COUNT] = [
        HandJoint::Wrist,
        HandJoint::ThumbCmc,
        HandJoint::ThumbMcp,
        HandJoint::ThumbIp,
        HandJoint::ThumbTip,
        HandJoint::IndexMcp,
        HandJoint::IndexPip,
        HandJoint::IndexDip,
        HandJoint::IndexTip,
        HandJoint::MiddleMcp,
        HandJoint::MiddlePip,
        HandJoint::MiddleDip,
        HandJoint::MiddleTip,
        HandJoint::RingMcp,
        HandJoint::RingPip,
        HandJoint::RingDip,
        HandJoint::RingTip,
        HandJoint::LittleMcp,
        HandJoint::LittlePip,
        HandJoint::LittleDip,
        HandJoint::LittleTip,
    ];

    /// Index of the joint in the dense 21-point layout.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the joint is a fingertip
    pub fn is_tip(self) -> bool {
        matches!(
            self,
            HandJoint::ThumbTip
                | HandJoint::IndexTip
                | HandJoint::MiddleTip
                | HandJoint::RingTip
                | HandJoint::LittleTip
        )
    }
}

/// A single detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Normalized X (0.0 - 1.0)
    pub x: f64,
    /// Normalized Y (0.0 - 1.0)
    pub y: f64,
    /// Detector confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Position as a vector
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance to another landmark in normalized space
    pub fn distance(&self, other: &LandmarkPoint) -> f64 {
        self.position().distance(other.position())
    }

    /// Check that coordinates are finite and confidence lies in [0, 1].
    pub fn validate(&self, joint: HandJoint) -> Result<(), TrackerError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(TrackerError::invalid_landmark(
                joint,
                format!("non-finite coordinate ({}, {})", self.x, self.y),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TrackerError::invalid_landmark(
                joint,
                format!("confidence {} out of range", self.confidence),
            ));
        }
        Ok(())
    }
}

/// Landmarks of one hand in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandObservation {
    landmarks: BTreeMap<HandJoint, LandmarkPoint>,
}

impl HandObservation {
    /// Create an empty observation
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, joint: HandJoint, point: LandmarkPoint) -> Self {
        self.insert(joint, point);
        self
    }

    /// Observation with only the two pinch landmarks
    pub fn pinch(index_tip: LandmarkPoint, thumb_tip: LandmarkPoint) -> Self {
        Self::new()
            .with(HandJoint::IndexTip, index_tip)
            .with(HandJoint::ThumbTip, thumb_tip)
    }

    /// Build from a dense 21-point landmark array sharing one hand confidence,
    /// as produced by single-score landmark models.
    pub fn from_dense(points: &[[f32; 2]; JOINT_COUNT], confidence: f32) -> Self {
        let landmarks = HandJoint::ALL
            .iter()
            .zip(points.iter())
            .map(|(&joint, p)| {
                (
                    joint,
                    LandmarkPoint::new(p[0] as f64, p[1] as f64, confidence as f64),
                )
            })
            .collect();
        Self { landmarks }
    }

    pub fn insert(&mut self, joint: HandJoint, point: LandmarkPoint) {
        self.landmarks.insert(joint, point);
    }

    pub fn get(&self, joint: HandJoint) -> Option<&LandmarkPoint> {
        self.landmarks.get(&joint)
    }

    pub fn index_tip(&self) -> Option<&LandmarkPoint> {
        self.get(HandJoint::IndexTip)
    }

    pub fn thumb_tip(&self) -> Option<&LandmarkPoint> {
        self.get(HandJoint::ThumbTip)
    }

    /// Whether any landmark was detected with non-zero confidence
    pub fn any_visible(&self) -> bool {
        self.landmarks.values().any(|p| p.confidence > 0.0)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandJoint, &LandmarkPoint)> {
        self.landmarks.iter().map(|(joint, point)| (*joint, point))
    }
}
