use serde::Serialize;

/// Generation id of a throw. Every `load` gets a fresh, larger one.
pub type ThrowId = u64;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    Arrived,
}

/// Playback state of the throw currently on screen.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct AnimationState {
    throw_id: ThrowId,
    start_time: f64,
    phase: Phase,
    pub(super) accumulated_spin_angle: f64,
    paused_at: Option<f64>,
}

impl AnimationState {
    pub(super) fn start(throw_id: ThrowId, now: f64) -> Self {
        Self {
            throw_id,
            start_time: now,
            phase: Phase::Running,
            accumulated_spin_angle: 0.,
            paused_at: None,
        }
    }

    pub fn throw_id(&self) -> ThrowId {
        self.throw_id
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn accumulated_spin_angle(&self) -> f64 {
        self.accumulated_spin_angle
    }

    /// Running time since release. Frozen while paused, never negative.
    pub fn elapsed_at(&self, now: f64) -> f64 {
        let until = self.paused_at.unwrap_or(now);
        (until - self.start_time).max(0.)
    }

    pub(super) fn pause(&mut self, now: f64) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Paused;
        self.paused_at = Some(now);
        true
    }

    /// Shifts the start time by the paused duration so elapsed time doesn't jump.
    pub(super) fn resume(&mut self, now: f64) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        if let Some(paused_at) = self.paused_at.take() {
            self.start_time += (now - paused_at).max(0.);
        }
        self.phase = Phase::Running;
        true
    }

    pub(super) fn arrive(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Arrived;
        true
    }
}
