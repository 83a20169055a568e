//! Rendering consumers
//!
//! The tracker never draws. Renderers implement [`StrokeSink`] and react to
//! the [`StrokeUpdate`] stream, or rebuild from stored strokes with
//! [`replay_stroke`].

use bytemuck::{Pod, Zeroable};
use glam::DVec2;

use crate::config::StrokeStyle;
use crate::stroke::Stroke;
use crate::tracker::StrokeUpdate;

/// Consumer of stroke updates
pub trait StrokeSink {
    /// Apply one update
    fn apply(&mut self, update: &StrokeUpdate);

    /// Drop everything drawn so far
    fn clear(&mut self);
}

/// Feed a stored stroke into a sink as the update sequence that built it.
pub fn replay_stroke<S: StrokeSink + ?Sized>(stroke: &Stroke, sink: &mut S) {
    sink.apply(&StrokeUpdate::StrokeStarted(stroke.start()));
    for segment in stroke.segments() {
        sink.apply(&StrokeUpdate::SegmentAppended {
            from: segment.from,
            to: segment.to,
        });
    }
    if stroke.is_sealed() {
        sink.apply(&StrokeUpdate::StrokeSealed);
    }
}

/// Records polylines, one per stroke
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRecorder {
    paths: Vec<Vec<DVec2>>,
    open: bool,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded polylines, oldest first
    pub fn paths(&self) -> &[Vec<DVec2>] {
        &self.paths
    }

    /// Whether the last path is still being drawn
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl StrokeSink for PathRecorder {
    fn apply(&mut self, update: &StrokeUpdate) {
        match *update {
            StrokeUpdate::NoChange => {}
            StrokeUpdate::StrokeStarted(point) => {
                self.paths.push(vec![point]);
                self.open = true;
            }
            StrokeUpdate::SegmentAppended { from, to } => {
                if self.open {
                    if let Some(path) = self.paths.last_mut() {
                        path.push(to);
                        return;
                    }
                }
                log::warn!("Segment received with no open path, starting one");
                self.paths.push(vec![from, to]);
                self.open = true;
            }
            StrokeUpdate::StrokeSealed => self.open = false,
        }
    }

    fn clear(&mut self) {
        self.paths.clear();
        self.open = false;
    }
}

/// Vertex for GPU line-list rendering
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Builds a line-list vertex buffer (two vertices per segment)
#[derive(Debug, Clone)]
pub struct LineVertexBuilder {
    style: StrokeStyle,
    vertices: Vec<LineVertex>,
}

impl LineVertexBuilder {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            vertices: Vec::new(),
        }
    }

    /// Build vertices for a set of stored strokes
    pub fn from_strokes(strokes: &[Stroke], style: StrokeStyle) -> Self {
        let mut builder = Self::new(style);
        for stroke in strokes {
            replay_stroke(stroke, &mut builder);
        }
        builder
    }

    fn vertex(&self, point: DVec2) -> LineVertex {
        LineVertex {
            position: [point.x as f32, point.y as f32],
            color: self.style.color,
        }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn line_width(&self) -> f32 {
        self.style.line_width
    }
}

impl StrokeSink for LineVertexBuilder {
    fn apply(&mut self, update: &StrokeUpdate) {
        if let StrokeUpdate::SegmentAppended { from, to } = *update {
            let from = self.vertex(from);
            let to = self.vertex(to);
            self.vertices.push(from);
            self.vertices.push(to);
        }
    }

    fn clear(&mut self) {
        self.vertices.clear();
    }
}
