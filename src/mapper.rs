//! Detector-space to view-space coordinate mapping
//!
//! The tracker smooths and records points in view space. How normalized
//! detector coordinates land in the view (scaling, front-camera mirroring,
//! origin flips) is decided by the injected [`CoordinateMapper`].

use glam::DVec2;

/// Maps a normalized detector point into view coordinates.
pub trait CoordinateMapper {
    fn map(&self, normalized: DVec2) -> DVec2;
}

impl<F> CoordinateMapper for F
where
    F: Fn(DVec2) -> DVec2,
{
    fn map(&self, normalized: DVec2) -> DVec2 {
        self(normalized)
    }
}

/// Identity mapping: view space is the normalized detector space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedSpace;

impl CoordinateMapper for NormalizedSpace {
    fn map(&self, normalized: DVec2) -> DVec2 {
        normalized
    }
}

/// Scales normalized points into a view of fixed size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapper {
    /// View width
    pub width: f64,
    /// View height
    pub height: f64,
    /// Mirror horizontally (front-facing camera)
    pub mirror_x: bool,
    /// Detector origin is bottom-left, view origin is top-left
    pub flip_y: bool,
}

impl ViewportMapper {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            mirror_x: false,
            flip_y: false,
        }
    }

    /// Mapper for a front camera preview: mirrored horizontally
    pub fn front_camera(width: f64, height: f64) -> Self {
        Self {
            mirror_x: true,
            ..Self::new(width, height)
        }
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

impl CoordinateMapper for ViewportMapper {
    fn map(&self, normalized: DVec2) -> DVec2 {
        let x = normalized.x * self.width;
        let y = normalized.y * self.height;
        DVec2::new(
            if self.mirror_x { self.width - x } else { x },
            if self.flip_y { self.height - y } else { y },
        )
    }
}
