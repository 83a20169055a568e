//! Gesture-to-stroke tracker
//!
//! Runs the per-frame pipeline: classify the pinch, map the index tip into
//! view space, smooth it and extend the current stroke. The tracker owns all
//! sequential state (drawing state, smoothing window, stroke history), so one
//! instance must see the frames of one hand in arrival order.
//!
//! ```
//! use pinch_draw::{HandObservation, LandmarkPoint, StrokeTracker, StrokeUpdate, TrackerConfig};
//!
//! let mut tracker = StrokeTracker::new(TrackerConfig::default()).unwrap();
//! let hand = HandObservation::pinch(
//!     LandmarkPoint::new(0.50, 0.50, 0.9),
//!     LandmarkPoint::new(0.52, 0.50, 0.9),
//! );
//! let report = tracker.on_observation(Some(&hand));
//! assert!(matches!(report.update, StrokeUpdate::StrokeStarted(_)));
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::classifier::{Gesture, GestureClassifier};
use crate::config::{StrokeStyle, TrackerConfig};
use crate::error::TrackerError;
use crate::landmarks::{HandJoint, HandObservation};
use crate::mapper::{CoordinateMapper, NormalizedSpace};
use crate::smoother::SmoothingWindow;
use crate::stroke::Stroke;

/// Event emitted for every processed frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrokeUpdate {
    /// Nothing changed
    NoChange,
    /// A new stroke was opened at this point
    StrokeStarted(DVec2),
    /// The current stroke was extended
    SegmentAppended { from: DVec2, to: DVec2 },
    /// The current stroke was finished
    StrokeSealed,
}

/// Pen state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing { last_point: DVec2 },
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawingState::Drawing { .. })
    }

    pub fn last_point(&self) -> Option<DVec2> {
        match self {
            DrawingState::Idle => None,
            DrawingState::Drawing { last_point } => Some(*last_point),
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// What the renderer should do
    pub update: StrokeUpdate,
    /// Gesture used for the state transition
    pub gesture: Gesture,
    /// Input problem found in this frame, if any
    pub fault: Option<TrackerError>,
}

/// Pinch drawing pipeline for a single hand
pub struct StrokeTracker<M = NormalizedSpace> {
    config: TrackerConfig,
    classifier: GestureClassifier,
    mapper: M,
    window: SmoothingWindow,
    state: DrawingState,
    strokes: Vec<Stroke>,
}

impl StrokeTracker<NormalizedSpace> {
    /// Tracker recording points in normalized detector space
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_mapper(config, NormalizedSpace)
    }
}

impl<M: CoordinateMapper> StrokeTracker<M> {
    /// Tracker recording points in the space produced by `mapper`
    pub fn with_mapper(config: TrackerConfig, mapper: M) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            classifier: GestureClassifier::from_config(&config),
            window: SmoothingWindow::new(config.smoothing_window_capacity),
            config,
            mapper,
            state: DrawingState::Idle,
            strokes: Vec::new(),
        })
    }

    /// Process one frame. `None` means the detector found no hand.
    pub fn on_observation(&mut self, observation: Option<&HandObservation>) -> FrameReport {
        let (gesture, mut fault) = match self.classifier.classify(observation) {
            Ok(gesture) => (gesture, None),
            Err(e) => (Gesture::HandVisibleNotPinching, Some(e)),
        };

        let update = match gesture {
            Gesture::Pinching(tip) => {
                let point = self.mapper.map(tip.position());
                match self.pen_down(point) {
                    Ok(update) => update,
                    Err(e) => {
                        fault = Some(e);
                        self.pen_up()
                    }
                }
            }
            Gesture::NoHand | Gesture::HandVisibleNotPinching => self.pen_up(),
        };

        if let Some(ref e) = fault {
            log::warn!("Rejected frame input: {}", e);
        }

        let gesture = if fault.is_some() {
            Gesture::HandVisibleNotPinching
        } else {
            gesture
        };

        FrameReport {
            update,
            gesture,
            fault,
        }
    }

    fn pen_down(&mut self, point: DVec2) -> Result<StrokeUpdate, TrackerError> {
        if !point.is_finite() {
            return Err(TrackerError::invalid_landmark(
                HandJoint::IndexTip,
                format!("mapped to non-finite view point {}", point),
            ));
        }
        let Some(smoothed) = self.window.try_smooth(point) else {
            return Err(TrackerError::invalid_landmark(
                HandJoint::IndexTip,
                format!("smoothed position overflowed at view point {}", point),
            ));
        };

        if self.state.is_drawing() {
            if let Some(segment) = self.strokes.last_mut().and_then(|s| s.extend_to(smoothed)) {
                self.state = DrawingState::Drawing { last_point: smoothed };
                return Ok(StrokeUpdate::SegmentAppended {
                    from: segment.from,
                    to: segment.to,
                });
            }
        }

        self.strokes.push(Stroke::new(smoothed));
        self.state = DrawingState::Drawing { last_point: smoothed };
        log::debug!("Stroke {} started at {}", self.strokes.len(), smoothed);
        Ok(StrokeUpdate::StrokeStarted(smoothed))
    }

    fn pen_up(&mut self) -> StrokeUpdate {
        self.window.clear();
        if !self.state.is_drawing() {
            return StrokeUpdate::NoChange;
        }

        let count = self.strokes.len();
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.seal();
            log::debug!(
                "Stroke {} sealed with {} segments",
                count,
                stroke.segments().len()
            );
        }
        self.state = DrawingState::Idle;
        StrokeUpdate::StrokeSealed
    }

    /// Discard all strokes and reset to idle. Returns the number discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.strokes.len();
        self.strokes.clear();
        self.window.clear();
        self.state = DrawingState::Idle;
        if discarded > 0 {
            log::debug!("Cleared {} strokes", discarded);
        }
        discarded
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.config.style
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    /// All strokes, oldest first. The last one is open while drawing.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The stroke currently being drawn
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.strokes.last().filter(|s| !s.is_sealed())
    }

    pub fn window(&self) -> &SmoothingWindow {
        &self.window
    }

    /// Pen indicator position, shown only while drawing
    pub fn indicator(&self) -> Option<DVec2> {
        self.state.last_point()
    }
}
