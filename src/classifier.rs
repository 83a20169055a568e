//! Gesture classifier
//!
//! Decides per frame whether index finger and thumb are pinched together.
//! Classification is a pure function of the observation and the thresholds.

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::landmarks::{HandJoint, HandObservation, LandmarkPoint};

/// Classification result for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// No hand tracked
    NoHand,
    /// Hand present, fingers apart or tips not confidently detected
    HandVisibleNotPinching,
    /// Fingers pinched; carries the index tip
    Pinching(LandmarkPoint),
}

impl Gesture {
    pub fn is_pinching(&self) -> bool {
        matches!(self, Gesture::Pinching(_))
    }
}

/// Pinch classifier with fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    index_confidence_min: f64,
    thumb_confidence_min: f64,
    pinch_distance_max: f64,
}

impl GestureClassifier {
    pub fn new(index_confidence_min: f64, thumb_confidence_min: f64, pinch_distance_max: f64) -> Self {
        Self {
            index_confidence_min,
            thumb_confidence_min,
            pinch_distance_max,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            config.index_confidence_min,
            config.thumb_confidence_min,
            config.pinch_distance_max,
        )
    }

    /// Classify one frame.
    ///
    /// Returns `InvalidLandmark` when a pinch landmark carries a non-finite
    /// coordinate or an out-of-range confidence.
    pub fn classify(&self, observation: Option<&HandObservation>) -> Result<Gesture, TrackerError> {
        let Some(hand) = observation else {
            return Ok(Gesture::NoHand);
        };

        let index_tip = hand.index_tip();
        let thumb_tip = hand.thumb_tip();
        if let Some(point) = index_tip {
            point.validate(HandJoint::IndexTip)?;
        }
        if let Some(point) = thumb_tip {
            point.validate(HandJoint::ThumbTip)?;
        }

        let accepted = match (index_tip, thumb_tip) {
            (Some(index), Some(thumb))
                if index.confidence >= self.index_confidence_min
                    && thumb.confidence >= self.thumb_confidence_min =>
            {
                Some((index, thumb))
            }
            _ => None,
        };

        let Some((index, thumb)) = accepted else {
            return Ok(if hand.any_visible() {
                Gesture::HandVisibleNotPinching
            } else {
                Gesture::NoHand
            });
        };

        if index.distance(thumb) < self.pinch_distance_max {
            Ok(Gesture::Pinching(*index))
        } else {
            Ok(Gesture::HandVisibleNotPinching)
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(index: (f64, f64, f64), thumb: (f64, f64, f64)) -> HandObservation {
        HandObservation::pinch(
            LandmarkPoint::new(index.0, index.1, index.2),
            LandmarkPoint::new(thumb.0, thumb.1, thumb.2),
        )
    }

    #[test]
    fn test_no_observation() {
        let classifier = GestureClassifier::default();
        assert_eq!(classifier.classify(None).unwrap(), Gesture::NoHand);
    }

    #[test]
    fn test_pinching() {
        let classifier = GestureClassifier::default();
        let obs = hand((0.50, 0.50, 0.9), (0.52, 0.50, 0.9));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::Pinching(LandmarkPoint::new(0.50, 0.50, 0.9))
        );
    }

    #[test]
    fn test_fingers_apart() {
        let classifier = GestureClassifier::default();
        let obs = hand((0.50, 0.50, 0.9), (0.60, 0.50, 0.9));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::HandVisibleNotPinching
        );
    }

    #[test]
    fn test_distance_at_threshold_is_not_a_pinch() {
        let classifier = GestureClassifier::new(0.8, 0.5, 0.25);
        let obs = hand((0.25, 0.5, 0.9), (0.5, 0.5, 0.9));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::HandVisibleNotPinching
        );
    }

    #[test]
    fn test_low_confidence() {
        let classifier = GestureClassifier::default();

        let obs = hand((0.50, 0.50, 0.3), (0.52, 0.50, 0.9));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::HandVisibleNotPinching
        );

        let obs = hand((0.50, 0.50, 0.9), (0.52, 0.50, 0.4));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::HandVisibleNotPinching
        );
    }

    #[test]
    fn test_confidence_equal_to_threshold_passes() {
        let classifier = GestureClassifier::default();
        let obs = hand((0.50, 0.50, 0.8), (0.52, 0.50, 0.5));
        assert!(classifier.classify(Some(&obs)).unwrap().is_pinching());
    }

    #[test]
    fn test_nothing_visible_is_no_hand() {
        let classifier = GestureClassifier::default();
        let obs = hand((0.50, 0.50, 0.0), (0.52, 0.50, 0.0));
        assert_eq!(classifier.classify(Some(&obs)).unwrap(), Gesture::NoHand);
        assert_eq!(
            classifier.classify(Some(&HandObservation::new())).unwrap(),
            Gesture::NoHand
        );
    }

    #[test]
    fn test_missing_thumb_with_visible_wrist() {
        let classifier = GestureClassifier::default();
        let obs = HandObservation::new()
            .with(HandJoint::IndexTip, LandmarkPoint::new(0.5, 0.5, 0.9))
            .with(HandJoint::Wrist, LandmarkPoint::new(0.5, 0.8, 0.7));
        assert_eq!(
            classifier.classify(Some(&obs)).unwrap(),
            Gesture::HandVisibleNotPinching
        );
    }

    #[test]
    fn test_invalid_landmark() {
        let classifier = GestureClassifier::default();

        let obs = hand((f64::NAN, 0.50, 0.9), (0.52, 0.50, 0.9));
        assert!(matches!(
            classifier.classify(Some(&obs)),
            Err(TrackerError::InvalidLandmark { joint: HandJoint::IndexTip, .. })
        ));

        let obs = hand((0.50, 0.50, 0.9), (0.52, 0.50, 1.5));
        assert!(matches!(
            classifier.classify(Some(&obs)),
            Err(TrackerError::InvalidLandmark { joint: HandJoint::ThumbTip, .. })
        ));
    }
}
