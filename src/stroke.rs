//! Strokes built from connected line segments.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A line segment in view space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: DVec2,
    pub to: DVec2,
}

impl Segment {
    pub fn new(from: DVec2, to: DVec2) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }
}

/// One continuous pinch episode
///
/// Segments are connected: each starts where the previous one ended.
/// Once sealed a stroke no longer accepts segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    start: DVec2,
    segments: Vec<Segment>,
    sealed: bool,
}

impl Stroke {
    /// Open a stroke at `start`
    pub fn new(start: DVec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
            sealed: false,
        }
    }

    /// Extend the stroke to `point`. Returns `None` if the stroke is sealed.
    pub fn extend_to(&mut self, point: DVec2) -> Option<Segment> {
        if self.sealed {
            return None;
        }
        let segment = Segment::new(self.end(), point);
        self.segments.push(segment);
        Some(segment)
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    /// Last point of the stroke
    pub fn end(&self) -> DVec2 {
        self.segments.last().map_or(self.start, |s| s.to)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Polyline vertices: start followed by each segment end
    pub fn points(&self) -> Vec<DVec2> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(|s| s.to))
            .collect()
    }

    /// Total path length
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}
