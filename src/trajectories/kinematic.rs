// Closed form constant acceleration flight, evaluated straight from t.
// Nothing in here keeps state between calls, so variable frame durations can't drift.

use crate::{
    math::{rpm_to_rad_per_sec, Vec3},
    pitch::PitchParameters,
};

use super::Trajectory;

/// `p(t) = release + v0 * t + 0.5 * a * t²`, per axis. Defined for every `t`.
pub fn position_at(params: &PitchParameters, t: f64) -> Vec3 {
    params.release_position + params.initial_velocity * t + params.acceleration * (0.5 * t * t)
}

pub fn velocity_at(params: &PitchParameters, t: f64) -> Vec3 {
    params.initial_velocity + params.acceleration * t
}

/// Absolute spin angle (radians) accumulated since release.
pub fn spin_angle_at(params: &PitchParameters, t: f64) -> f64 {
    rpm_to_rad_per_sec(params.spin_rate) * t
}

/// Unit spin axis lying in the horizontal plane: `(cos θ, 0, sin θ)`.
pub fn spin_axis_vector(degrees: f64) -> Vec3 {
    let radians = degrees.to_radians();
    Vec3::new(radians.cos(), 0., radians.sin()).normalized()
}

/// Smallest non negative time at which the ball's z reaches `target_plane_z`,
/// `None` if it never does (zero or reversed z velocity for instance).
pub fn plane_crossing_time(params: &PitchParameters, target_plane_z: f64) -> Option<f64> {
    let a = 0.5 * params.acceleration.z;
    let b = params.initial_velocity.z;
    let c = params.release_position.z - target_plane_z;

    if a.abs() < f64::EPSILON {
        if b == 0. {
            return (c == 0.).then_some(0.);
        }
        let t = -c / b;
        return (t >= 0.).then_some(t);
    }

    let discriminant = b * b - 4. * a * c;
    if discriminant < 0. {
        return None;
    }
    let sqrt = discriminant.sqrt();
    [(-b - sqrt) / (2. * a), (-b + sqrt) / (2. * a)]
        .into_iter()
        .filter(|t| *t >= 0.)
        .min_by(|t1, t2| t1.total_cmp(t2))
}

/// Longest the throw may last: `max_flight`, or the pitch's own `time_to_plate` if shorter.
pub fn flight_limit(params: &PitchParameters, max_flight: f64) -> f64 {
    params
        .time_to_plate
        .map_or(max_flight, |limit| limit.min(max_flight))
}

/// True once the ball has reached or passed the target plane (on the far side from the
/// release point), or once `t` reaches the pitch's `time_to_plate` or exceeds `max_flight`.
pub fn has_arrived(params: &PitchParameters, t: f64, target_plane_z: f64, max_flight: f64) -> bool {
    if params.time_to_plate.is_some_and(|limit| t >= limit) || t > max_flight {
        return true;
    }
    let release_z = params.release_position.z;
    let z = position_at(params, t).z;
    if release_z > target_plane_z {
        z <= target_plane_z
    } else if release_z < target_plane_z {
        z >= target_plane_z
    } else {
        true
    }
}

/// A pitch seen as a [`Trajectory`] that ends at the target plane.
#[derive(Clone, Debug)]
pub struct PitchTrajectory {
    params: PitchParameters,
    runtime: f64,
}

impl PitchTrajectory {
    /// The runtime is the analytic plane crossing time, capped by the flight limit.
    pub fn new(params: PitchParameters, target_plane_z: f64, max_flight: f64) -> Self {
        let limit = flight_limit(&params, max_flight);
        let runtime = plane_crossing_time(&params, target_plane_z).map_or(limit, |t| t.min(limit));
        Self { params, runtime }
    }

    pub fn params(&self) -> &PitchParameters {
        &self.params
    }

    /// Samples `(t, position)` every `step` seconds from release, always including the end.
    pub fn sample(&self, step: f64) -> impl Iterator<Item = (f64, Vec3)> + '_ {
        let count = if step > 0. {
            (self.runtime / step).floor() as usize
        } else {
            0
        };
        (0..=count)
            .map(move |i| i as f64 * step)
            .filter(|t| *t < self.runtime)
            .chain(std::iter::once(self.runtime))
            .map(|t| (t, self.get_position(t)))
    }
}

impl Trajectory<Vec3, Vec3> for PitchTrajectory {
    fn get_position(&self, t: f64) -> Vec3 {
        position_at(&self.params, t.clamp(0., self.runtime))
    }

    fn get_velocity(&self, t: f64) -> Vec3 {
        velocity_at(&self.params, t.clamp(0., self.runtime))
    }

    fn get_acceleration(&self, _t: f64) -> Vec3 {
        self.params.acceleration
    }

    fn get_total_runtime(&self) -> f64 {
        self.runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const PLATE_Z: f64 = -60.5;

    fn scenario_pitch() -> PitchParameters {
        PitchParameters {
            release_position: Vec3::new(0., 6., 0.),
            initial_velocity: Vec3::new(0., 0., -130.),
            acceleration: Vec3::new(0., -32.17, 0.),
            spin_rate: 2400.,
            spin_axis: 180.,
            pitch_type: "FF".into(),
            time_to_plate: None,
        }
    }

    fn random_vec(rng: &mut StdRng, range: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        )
    }

    fn random_pitch(rng: &mut StdRng) -> PitchParameters {
        PitchParameters {
            release_position: random_vec(rng, 60.),
            initial_velocity: random_vec(rng, 150.),
            acceleration: random_vec(rng, 40.),
            spin_rate: rng.gen_range(0. ..3500.),
            spin_axis: rng.gen_range(0. ..360.),
            pitch_type: Default::default(),
            time_to_plate: None,
        }
    }

    #[test]
    fn position_at_zero_is_release_point() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = random_pitch(&mut rng);
            assert_eq!(position_at(&p, 0.), p.release_position);
        }
    }

    #[test]
    fn position_matches_per_axis_formula() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = random_pitch(&mut rng);
            let t = rng.gen_range(0. ..1.);
            let pos = position_at(&p, t);
            let expected_y = p.release_position.y
                + p.initial_velocity.y * t
                + 0.5 * p.acceleration.y * t * t;
            assert!((pos.y - expected_y).abs() < 1e-9);
        }
    }

    #[test]
    fn spin_axis_is_unit_and_deterministic() {
        for deg in (0..=360).step_by(15) {
            let a = spin_axis_vector(deg as f64);
            let b = spin_axis_vector(deg as f64);
            assert_eq!(a, b);
            assert!((a.norm() - 1.).abs() < 1e-12);
            assert_eq!(a.y, 0.);
        }
    }

    #[test]
    fn spin_angle_never_decreases() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = random_pitch(&mut rng);
            let mut last = spin_angle_at(&p, 0.);
            for i in 1..50 {
                let angle = spin_angle_at(&p, i as f64 * 0.01);
                assert!(angle >= last);
                last = angle;
            }
        }
    }

    #[test]
    fn zero_spin_rate_never_spins() {
        let p = PitchParameters {
            spin_rate: 0.,
            spin_axis: 97.,
            ..scenario_pitch()
        };
        for i in 0..100 {
            assert_eq!(spin_angle_at(&p, i as f64 * 0.01), 0.);
        }
    }

    #[test]
    fn scenario_arrives_at_plate_around_465ms() {
        let p = scenario_pitch();
        let t = plane_crossing_time(&p, PLATE_Z).unwrap();
        assert!((t - 60.5 / 130.).abs() < 1e-9);
        assert!((position_at(&p, t).y - 2.516).abs() < 0.01);

        assert!(!has_arrived(&p, 0.46, PLATE_Z, 1.));
        assert!(has_arrived(&p, 0.47, PLATE_Z, 1.));
    }

    #[test]
    fn max_flight_bounds_pitches_that_never_arrive() {
        let p = PitchParameters {
            initial_velocity: Vec3::new(0., 0., 20.),
            ..scenario_pitch()
        };
        assert_eq!(plane_crossing_time(&p, PLATE_Z), None);
        assert!(!has_arrived(&p, 0.5, PLATE_Z, 0.6));
        assert!(has_arrived(&p, 0.61, PLATE_Z, 0.6));
    }

    #[test]
    fn time_to_plate_ends_the_flight_early() {
        let p = PitchParameters {
            time_to_plate: Some(0.3),
            ..scenario_pitch()
        };
        assert_eq!(flight_limit(&p, 1.), 0.3);
        assert_eq!(flight_limit(&p, 0.2), 0.2);
        assert!(!has_arrived(&p, 0.29, PLATE_Z, 1.));
        assert!(has_arrived(&p, 0.3, PLATE_Z, 1.));

        let traj = PitchTrajectory::new(p.clone(), PLATE_Z, 1.);
        assert_eq!(traj.get_total_runtime(), 0.3);
        assert_eq!(traj.get_final_destination(), position_at(&p, 0.3));
    }

    #[test]
    fn crossing_time_with_z_acceleration() {
        let p = PitchParameters {
            initial_velocity: Vec3::new(0., 0., -130.),
            acceleration: Vec3::new(0., -32.17, 28.),
            ..scenario_pitch()
        };
        let t = plane_crossing_time(&p, PLATE_Z).unwrap();
        assert!((position_at(&p, t).z - PLATE_Z).abs() < 1e-9);
    }

    #[test]
    fn pitch_trajectory_stops_at_the_plate() {
        let traj = PitchTrajectory::new(scenario_pitch(), PLATE_Z, 1.);
        assert!((traj.get_total_runtime() - 60.5 / 130.).abs() < 1e-9);
        assert!((traj.get_final_destination().z - PLATE_Z).abs() < 1e-9);
        assert_eq!(traj.get_position(5.), traj.get_final_destination());
        assert_eq!(traj.get_velocity(0.), Vec3::new(0., 0., -130.));

        let samples: Vec<_> = traj.sample(0.1).collect();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0].0, 0.);
        assert_eq!(samples[5].0, traj.get_total_runtime());
    }
}
