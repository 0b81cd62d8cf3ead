//! The boundary between the playback core and whatever draws the scene.

use serde::Serialize;
use std::fmt::Debug;

use crate::math::Vec3;

/// What a visual object stands for, so the target can pick geometry and material.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum VisualKind {
    Ball { color: &'static str },
    TrailMarker,
}

impl VisualKind {
    pub fn is_ball(&self) -> bool {
        matches!(self, VisualKind::Ball { .. })
    }
}

/// An opaque scene the playback controller draws into.
///
/// Implementors own the objects behind the handles; the controller only ever refers to
/// objects it created itself and removes each of them at most once.
pub trait RenderTarget {
    type Handle: Copy + Eq + Debug;

    fn create_visual_object(&mut self, kind: VisualKind) -> Self::Handle;
    fn set_position(&mut self, handle: Self::Handle, pos: Vec3);
    /// Rotates the object by `radians` around the world `axis`, on top of its current orientation.
    fn apply_rotation(&mut self, handle: Self::Handle, axis: Vec3, radians: f64);
    fn remove(&mut self, handle: Self::Handle);
    /// Monotonic clock, in seconds.
    fn now(&self) -> f64;
}
