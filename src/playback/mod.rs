//! Playback of a single throw.
//!
//! A [`PlaybackController`] owns everything that lives on screen for the throw it is
//! showing: the ball, the trail markers and the removals scheduled after arrival. UI
//! code only talks to it through its operations, and the host calls [`tick`] once per
//! frame with its monotonic clock. `load` starts the throw at the render target's
//! [`now`](crate::RenderTarget::now), so the times given to `tick`, `pause` and `resume`
//! are expected on that same clock.
//!
//! # Examples
//!
//! ```
//! use pitch_playback::{
//!     math::Vec3,
//!     pitch::PitchParameters,
//!     playback::{Phase, PlaybackController},
//!     testing::RecordingTarget,
//! };
//!
//! let pitch = PitchParameters {
//!     release_position: Vec3::new(0., 6., 0.),
//!     initial_velocity: Vec3::new(0., 0., -130.),
//!     acceleration: Vec3::new(0., -32.17, 0.),
//!     spin_rate: 2400.,
//!     spin_axis: 180.,
//!     pitch_type: "FF".into(),
//!     time_to_plate: None,
//! };
//!
//! let mut controller = PlaybackController::new(RecordingTarget::new(), Default::default());
//! controller.load(pitch).expect("valid pitch");
//! controller.tick(0.2);
//! assert_eq!(controller.phase(), Phase::Running);
//! controller.tick(0.5);
//! assert_eq!(controller.phase(), Phase::Arrived);
//! ```
//!
//! [`tick`]: PlaybackController::tick

mod deferred;
mod state;
mod trail;

pub use state::{AnimationState, Phase, ThrowId};
pub use trail::TrailMarker;

use std::fmt;
use tracing::{debug, info, warn};

use crate::{
    config::PlaybackConfig,
    math::Vec3,
    pitch::{PitchParameters, PitchType},
    render::{RenderTarget, VisualKind},
    trajectories::{
        flight_limit, has_arrived, plane_crossing_time, position_at, spin_angle_at,
        spin_axis_vector,
    },
};
use deferred::DeferredRemovals;
use trail::Trail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    /// a required numeric field is missing or unusable
    InvalidPitchData { field: &'static str },
    /// `replay` without a pitch, before anything was loaded
    NoPitchLoaded,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::InvalidPitchData { field } => {
                write!(f, "invalid pitch data: `{field}` is missing or not a usable number")
            }
            PlaybackError::NoPitchLoaded => write!(f, "no pitch loaded to replay"),
        }
    }
}

impl std::error::Error for PlaybackError {}

/// Sent to the arrival hook when a throw reaches the target plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalReport {
    pub throw_id: ThrowId,
    /// running time from release to arrival, seconds
    pub flight_time: f64,
    pub position: Vec3,
    pub pitch_type: PitchType,
}

pub type ArrivalHook = Box<dyn FnMut(&ArrivalReport) + Send>;

pub struct PlaybackController<R: RenderTarget> {
    target: R,
    config: PlaybackConfig,
    pitch: Option<PitchParameters>,
    state: AnimationState,
    next_throw_id: ThrowId,
    ball: Option<R::Handle>,
    trail: Trail<R::Handle>,
    trail_visible: bool,
    /// running time of the last trail sample of the current throw
    last_trail_sample: Option<f64>,
    deferred: DeferredRemovals<R::Handle>,
    on_arrived: Option<ArrivalHook>,
}

impl<R: RenderTarget> PlaybackController<R> {
    pub fn new(target: R, config: PlaybackConfig) -> Self {
        Self {
            target,
            trail: Trail::new(config.max_trail_markers),
            trail_visible: config.trail_visible,
            config,
            pitch: None,
            state: AnimationState::default(),
            next_throw_id: 0,
            ball: None,
            last_trail_sample: None,
            deferred: DeferredRemovals::default(),
            on_arrived: None,
        }
    }

    /// Registers the hook called once per throw, when it reaches the target plane.
    pub fn on_arrived(&mut self, hook: impl FnMut(&ArrivalReport) + Send + 'static) {
        self.on_arrived = Some(Box::new(hook));
    }

    /// Starts a new throw. Whatever the previous throw left on screen is removed first.
    ///
    /// Invalid data is rejected before anything changes: the previous throw keeps playing.
    pub fn load(&mut self, pitch: PitchParameters) -> Result<ThrowId, PlaybackError> {
        if let Err(e) = pitch.validate() {
            warn!(error = %e, "rejected pitch, keeping the current throw");
            return Err(e);
        }

        self.clear_visuals();

        let now = self.target.now();
        let ball = self.target.create_visual_object(VisualKind::Ball {
            color: pitch.pitch_type.color(),
        });
        self.target.set_position(ball, pitch.release_position);

        self.next_throw_id += 1;
        let throw_id = self.next_throw_id;
        self.state = AnimationState::start(throw_id, now);
        self.ball = Some(ball);
        self.last_trail_sample = None;
        info!(
            throw_id,
            pitch_type = %pitch.pitch_type,
            spin_rate = pitch.spin_rate,
            "loaded pitch"
        );
        self.pitch = Some(pitch);
        Ok(throw_id)
    }

    /// Restarts from release, with `pitch` or with the current pitch if `None`.
    pub fn replay(&mut self, pitch: Option<PitchParameters>) -> Result<ThrowId, PlaybackError> {
        let pitch = match pitch {
            Some(pitch) => pitch,
            None => self.pitch.clone().ok_or(PlaybackError::NoPitchLoaded)?,
        };
        self.load(pitch)
    }

    /// Advances the current throw to `now`. Called once per frame by the host.
    pub fn tick(&mut self, now: f64) {
        // these run whatever the phase, markers must expire while paused too
        self.expire_trail_markers(now);
        self.run_deferred_removals(now);

        if self.state.phase() != Phase::Running {
            return;
        }
        let (Some(pitch), Some(ball)) = (self.pitch.as_ref(), self.ball) else {
            return;
        };

        if now < self.state.start_time() {
            warn!(
                now,
                start_time = self.state.start_time(),
                "clock went backwards, clamping elapsed time to 0"
            );
        }
        let elapsed = self.state.elapsed_at(now);
        let arrived = has_arrived(
            pitch,
            elapsed,
            self.config.target_plane_z,
            self.config.max_flight_duration,
        );
        // an arrived ball is shown where its flight ended, not one frame past it
        let t = if arrived {
            let end = flight_limit(pitch, self.config.max_flight_duration).min(elapsed);
            plane_crossing_time(pitch, self.config.target_plane_z)
                .map_or(end, |crossing| crossing.min(end))
        } else {
            elapsed
        };
        let position = position_at(pitch, t);
        let angle = spin_angle_at(pitch, t);
        let axis = spin_axis_vector(pitch.spin_axis);
        let spinning = pitch.spin_rate > 0.;
        let pitch_type = arrived.then(|| pitch.pitch_type.clone());

        self.target.set_position(ball, position);
        let delta = angle - self.state.accumulated_spin_angle;
        if spinning && delta > 0. {
            self.target.apply_rotation(ball, axis, delta);
            self.state.accumulated_spin_angle = angle;
        }

        if self.trail_visible && self.trail_sample_due(t) {
            self.emit_trail_marker(position, now, t);
        }

        if let Some(pitch_type) = pitch_type {
            self.finish_throw(
                ArrivalReport {
                    throw_id: self.state.throw_id(),
                    flight_time: t,
                    position,
                    pitch_type,
                },
                ball,
                now,
            );
        }
    }

    /// Freezes the throw at `now`, on the same clock as [`tick`](Self::tick).
    pub fn pause(&mut self, now: f64) -> bool {
        let paused = self.state.pause(now);
        if paused {
            debug!(throw_id = self.state.throw_id(), "paused");
        }
        paused
    }

    pub fn resume(&mut self, now: f64) -> bool {
        let resumed = self.state.resume(now);
        if resumed {
            debug!(throw_id = self.state.throw_id(), "resumed");
        }
        resumed
    }

    /// Hiding the trail removes every marker right away.
    pub fn set_trail_visible(&mut self, visible: bool) {
        self.trail_visible = visible;
        if visible {
            self.last_trail_sample = None;
        } else {
            for marker in self.trail.take_all() {
                self.target.remove(marker.handle);
            }
        }
        debug!(visible, "trail visibility changed");
    }

    /// Removes the markers older than the retention window.
    pub fn expire_trail_markers(&mut self, now: f64) {
        for marker in self.trail.take_expired(now, self.config.trail_retention) {
            self.target.remove(marker.handle);
        }
    }

    /// Removes everything on screen and goes back to `Idle`.
    /// The current pitch is kept so it can still be replayed.
    pub fn dispose(&mut self) {
        self.clear_visuals();
        self.state = AnimationState::default();
        debug!("playback disposed");
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn current_pitch(&self) -> Option<&PitchParameters> {
        self.pitch.as_ref()
    }

    pub fn ball(&self) -> Option<R::Handle> {
        self.ball
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn trail_markers(&self) -> impl Iterator<Item = &TrailMarker<R::Handle>> {
        self.trail.iter()
    }

    pub fn trail_visible(&self) -> bool {
        self.trail_visible
    }

    pub fn pending_removals(&self) -> usize {
        self.deferred.len()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.target.now()
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    fn trail_sample_due(&self, t: f64) -> bool {
        self.last_trail_sample
            .map_or(true, |last| t - last >= self.config.trail_sample_interval)
    }

    fn emit_trail_marker(&mut self, position: Vec3, now: f64, t: f64) {
        let handle = self.target.create_visual_object(VisualKind::TrailMarker);
        self.target.set_position(handle, position);
        let evicted = self.trail.push(TrailMarker {
            position,
            created_at: now,
            handle,
        });
        for marker in evicted {
            self.target.remove(marker.handle);
        }
        self.last_trail_sample = Some(t);
    }

    fn finish_throw(&mut self, report: ArrivalReport, ball: R::Handle, now: f64) {
        self.state.arrive();
        self.deferred.schedule(
            report.throw_id,
            ball,
            now + self.config.arrival_display_window,
        );
        info!(
            throw_id = report.throw_id,
            flight_time = report.flight_time,
            "pitch reached the target plane"
        );
        if let Some(hook) = self.on_arrived.as_mut() {
            hook(&report);
        }
    }

    fn run_deferred_removals(&mut self, now: f64) {
        for handle in self.deferred.take_due(now, self.state.throw_id()) {
            self.target.remove(handle);
            if self.ball == Some(handle) {
                self.ball = None;
            }
            debug!(throw_id = self.state.throw_id(), "removed arrived ball");
        }
    }

    fn clear_visuals(&mut self) {
        if let Some(ball) = self.ball.take() {
            self.target.remove(ball);
        }
        for marker in self.trail.take_all() {
            self.target.remove(marker.handle);
        }
        self.deferred.cancel_all();
    }
}
