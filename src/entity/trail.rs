//! Fixed-capacity position history.

use std::collections::VecDeque;

use glam::Vec3;

/// Last `capacity` positions of a body, oldest first
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append the latest position, dropping the oldest once full
    pub fn push(&mut self, position: Vec3) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(position);
    }

    /// Positions ordered oldest → newest, for drawing as a connected polyline.
    /// Holds fewer than `capacity` points right after spawn.
    pub fn as_line_strip(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }

    pub fn latest(&self) -> Option<Vec3> {
        self.points.back().copied()
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

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
