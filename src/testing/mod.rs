//! Test doubles for the playback core.

mod recording_target;

pub use recording_target::{RecordedHandle, RecordedObject, RecordingTarget};
