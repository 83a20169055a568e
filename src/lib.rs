//! Pinch Draw - freehand drawing driven by hand landmarks
//!
//! Consumes per-frame hand landmark observations from an external detector,
//! classifies the pinch gesture, smooths the pen position and builds strokes.
//! Detection and rendering stay outside the crate: renderers react to the
//! [`StrokeUpdate`] events the tracker emits.

pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod landmarks;
pub mod mapper;
pub mod render;
pub mod smoother;
pub mod stroke;
pub mod telemetry;
pub mod tracker;

pub use classifier::{Gesture, GestureClassifier};
pub use config::{StrokeStyle, TrackerConfig};
pub use error::TrackerError;
pub use ingest::{FeedSnapshot, HandFrame, ObservationFeed};
pub use landmarks::{HandJoint, HandObservation, LandmarkPoint};
pub use mapper::{CoordinateMapper, NormalizedSpace, ViewportMapper};
pub use render::{LineVertex, LineVertexBuilder, PathRecorder, StrokeSink};
pub use smoother::SmoothingWindow;
pub use stroke::{Segment, Stroke};
pub use tracker::{DrawingState, FrameReport, StrokeTracker, StrokeUpdate};
