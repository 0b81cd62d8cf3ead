use std::collections::BTreeMap;

use crate::{
    math::Vec3,
    render::{RenderTarget, VisualKind},
};

pub type RecordedHandle = usize;

/// Last known state of an object living in a [`RecordingTarget`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedObject {
    pub kind: VisualKind,
    pub position: Vec3,
    /// sum of every rotation applied, radians
    pub total_rotation: f64,
    pub rotation_calls: usize,
    pub last_axis: Option<Vec3>,
}

/// Headless render target with a hand driven clock.
///
/// Keeps every live object and counts what happened to them, which makes leaks and
/// double removals visible.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    now: f64,
    next_handle: RecordedHandle,
    objects: BTreeMap<RecordedHandle, RecordedObject>,
    created: usize,
    removed: usize,
    unknown_handle_calls: usize,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn advance(&mut self, dt: f64) -> f64 {
        self.now += dt;
        self.now
    }

    pub fn object(&self, handle: RecordedHandle) -> Option<&RecordedObject> {
        self.objects.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.objects.len()
    }

    pub fn ball_count(&self) -> usize {
        self.objects.values().filter(|o| o.kind.is_ball()).count()
    }

    pub fn trail_marker_count(&self) -> usize {
        self.objects
            .values()
            .filter(|o| o.kind == VisualKind::TrailMarker)
            .count()
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Calls that referred to an object that doesn't exist (anymore).
    pub fn unknown_handle_calls(&self) -> usize {
        self.unknown_handle_calls
    }
}

impl RenderTarget for RecordingTarget {
    type Handle = RecordedHandle;

    fn create_visual_object(&mut self, kind: VisualKind) -> Self::Handle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.created += 1;
        self.objects.insert(
            handle,
            RecordedObject {
                kind,
                position: Vec3::zero(),
                total_rotation: 0.,
                rotation_calls: 0,
                last_axis: None,
            },
        );
        handle
    }

    fn set_position(&mut self, handle: Self::Handle, pos: Vec3) {
        match self.objects.get_mut(&handle) {
            Some(object) => object.position = pos,
            None => self.unknown_handle_calls += 1,
        }
    }

    fn apply_rotation(&mut self, handle: Self::Handle, axis: Vec3, radians: f64) {
        match self.objects.get_mut(&handle) {
            Some(object) => {
                object.total_rotation += radians;
                object.rotation_calls += 1;
                object.last_axis = Some(axis);
            }
            None => self.unknown_handle_calls += 1,
        }
    }

    fn remove(&mut self, handle: Self::Handle) {
        match self.objects.remove(&handle) {
            Some(_) => self.removed += 1,
            None => self.unknown_handle_calls += 1,
        }
    }

    fn now(&self) -> f64 {
        self.now
    }
}
