#![deny(clippy::unwrap_used)]
//! Playback engine for baseball pitch trajectories.
//!
//! [`trajectories`] computes where a pitch is and how far it has spun at any time after
//! release. [`playback`] turns that into an animation: a controller that owns the ball
//! and its trail in some [`render::RenderTarget`], advanced once per frame.
pub mod config;
pub mod host;
pub mod math;
pub mod pitch;
pub mod playback;
pub mod render;
pub mod testing;
pub mod trajectories;
pub mod viewer;

use std::sync::LockResult;

use tracing::warn;

pub use config::PlaybackConfig;
pub use pitch::{PitchParameters, PitchType, StatcastPitch};
pub use playback::{ArrivalReport, Phase, PlaybackController, PlaybackError};
pub use render::{RenderTarget, VisualKind};

pub trait IgnoreMutexErr<T> {
    fn unwrap_ignore_poison(self) -> T;
}

impl<T> IgnoreMutexErr<T> for LockResult<T> {
    fn unwrap_ignore_poison(self) -> T {
        match self {
            Ok(r) => r,
            Err(poisoned) => {
                // Handle mutex poisoning
                let guard = poisoned.into_inner();
                warn!("mutex was poisoned, recovering from mutex poisoning");
                guard
            }
        }
    }
}
