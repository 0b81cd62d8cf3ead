//! Prints sampled trajectories of Statcast pitches as JSON lines.
//!
//! Usage: `trajectory_table <pitches.json> [step_seconds]`

use pitch_playback::{
    config::{MAX_FLIGHT_DURATION, TARGET_PLANE_Z},
    math::Vec3,
    trajectories::{spin_angle_at, PitchTrajectory, Trajectory},
    PitchParameters, StatcastPitch,
};
use serde::Serialize;
use std::{error::Error, fs::File, io::BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_STEP: f64 = 0.01;

#[derive(Serialize)]
struct Sample {
    pitch: usize,
    t: f64,
    pos: Vec3,
    spin_angle: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: trajectory_table <pitches.json> [step_seconds]")?;
    let step = match args.next() {
        Some(step) => step.parse()?,
        None => DEFAULT_STEP,
    };

    let rows: Vec<StatcastPitch> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    for (i, row) in rows.into_iter().enumerate() {
        let pitch = match PitchParameters::try_from(row) {
            Ok(pitch) => pitch,
            Err(e) => {
                warn!(row = i, error = %e, "skipping pitch");
                continue;
            }
        };
        let trajectory = PitchTrajectory::new(pitch, TARGET_PLANE_Z, MAX_FLIGHT_DURATION);
        for (t, pos) in trajectory.sample(step) {
            let sample = Sample {
                pitch: i,
                t,
                pos,
                spin_angle: spin_angle_at(trajectory.params(), t),
            };
            println!("{}", serde_json::to_string(&sample)?);
        }
        let end = trajectory.get_final_destination();
        if (end.z - TARGET_PLANE_Z).abs() > 1e-6 {
            warn!(row = i, "pitch stops short of the plate");
        }
    }
    Ok(())
}
