use std::collections::VecDeque;

use crate::math::Vec3;

/// A past ball position left on screen for a while.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailMarker<H> {
    pub position: Vec3,
    pub created_at: f64,
    pub handle: H,
}

impl<H> TrailMarker<H> {
    pub fn is_expired(&self, now: f64, retention: f64) -> bool {
        now - self.created_at > retention
    }
}

/// Insertion ordered, bounded marker history.
#[derive(Debug)]
pub(crate) struct Trail<H> {
    markers: VecDeque<TrailMarker<H>>,
    capacity: usize,
}

impl<H: Copy> Trail<H> {
    pub fn new(capacity: usize) -> Self {
        Self {
            markers: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends a marker, returning the oldest ones that no longer fit.
    pub fn push(&mut self, marker: TrailMarker<H>) -> Vec<TrailMarker<H>> {
        self.markers.push_back(marker);
        let overflow = self.markers.len().saturating_sub(self.capacity);
        self.markers.drain(..overflow).collect()
    }

    /// Removes and returns every expired marker.
    // not just a prefix: created_at is only ordered as long as the host clock is
    pub fn take_expired(&mut self, now: f64, retention: f64) -> Vec<TrailMarker<H>> {
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .markers
            .drain(..)
            .partition(|m| m.is_expired(now, retention));
        self.markers = kept.into();
        expired
    }

    pub fn take_all(&mut self) -> Vec<TrailMarker<H>> {
        self.markers.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailMarker<H>> {
        self.markers.iter()
    }
}
