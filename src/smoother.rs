//! Moving-average smoothing of the pen position
//!
//! Keeps the last few view-space points and reports their mean to suppress
//! detector jitter.

use std::collections::VecDeque;

use glam::DVec2;

/// Default number of points averaged
pub const DEFAULT_CAPACITY: usize = 5;

/// Bounded FIFO of recent positions
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingWindow {
    points: VecDeque<DVec2>,
    capacity: usize,
}

impl SmoothingWindow {
    /// Create a window holding at most `capacity` points (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push a point and return the mean of the window.
    ///
    /// Evicts the oldest point once the window is over capacity.
    pub fn smooth(&mut self, point: DVec2) -> DVec2 {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
        self.mean()
    }

    /// Like [`smooth`](Self::smooth), but returns `None` and restores the
    /// previous window when the mean is not finite.
    pub fn try_smooth(&mut self, point: DVec2) -> Option<DVec2> {
        self.points.push_back(point);
        let evicted = if self.points.len() > self.capacity {
            self.points.pop_front()
        } else {
            None
        };

        let mean = self.mean();
        if mean.is_finite() {
            return Some(mean);
        }

        self.points.pop_back();
        if let Some(oldest) = evicted {
            self.points.push_front(oldest);
        }
        None
    }

    // Averages offsets from the oldest point so identical inputs come back bit-exact.
    fn mean(&self) -> DVec2 {
        let Some(&origin) = self.points.front() else {
            return DVec2::ZERO;
        };
        let offset: DVec2 = self.points.iter().map(|&p| p - origin).sum();
        origin + offset / self.points.len() as f64
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Points in arrival order, oldest first
    pub fn points(&self) -> impl Iterator<Item = &DVec2> {
        self.points.iter()
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
