//! Plays pitches in the websocket viewer, one after the other.
//!
//! Usage: `pitch_playback [pitches.json] [config.json]`
//!
//! `pitches.json` holds an array of Statcast rows. Without it a single demo fastball is
//! replayed. Set `RUST_LOG=debug` for playback details.

use pitch_playback::{
    host::{launch_playback_loop, PlaybackCommand, FRAME_PERIOD},
    math::Vec3,
    viewer::{self, ViewerScene, VIEWER_ADDR},
    PitchParameters, PlaybackConfig, PlaybackController, StatcastPitch,
};
use std::{error::Error, fs::File, io::BufReader, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// time between two pitches
const PITCH_PERIOD: Duration = Duration::from_secs(3);

fn demo_pitch() -> PitchParameters {
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

fn read_pitches(path: &str) -> Result<Vec<PitchParameters>, Box<dyn Error>> {
    let rows: Vec<StatcastPitch> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let total = rows.len();
    let pitches: Vec<PitchParameters> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| match PitchParameters::try_from(row) {
            Ok(pitch) => Some(pitch),
            Err(e) => {
                warn!(row = i, error = %e, "skipping pitch");
                None
            }
        })
        .collect();
    info!(loaded = pitches.len(), total, "read pitches from {}", path);
    Ok(pitches)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut pitches = match args.next() {
        Some(path) => read_pitches(&path)?,
        None => vec![demo_pitch()],
    };
    if pitches.is_empty() {
        warn!("no usable pitch, falling back to the demo fastball");
        pitches.push(demo_pitch());
    }
    let config = match args.next() {
        Some(path) => PlaybackConfig::from_json_file(path)?,
        None => PlaybackConfig::default(),
    };

    let scene = ViewerScene::new();
    viewer::serve(scene.clone(), VIEWER_ADDR.into()).await?;

    let mut controller = PlaybackController::new(scene, config);
    controller.on_arrived(|report| {
        info!(
            throw_id = report.throw_id,
            pitch_type = %report.pitch_type,
            flight_time = %format!("{:.3}s", report.flight_time),
            height = %format!("{:.2}ft", report.position.y),
            "pitch crossed the plate"
        )
    });
    let playback = launch_playback_loop(controller, FRAME_PERIOD);

    let mut next_pitch = pitches.iter().cycle();
    let mut interval = tokio::time::interval(PITCH_PERIOD);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(pitch) = next_pitch.next() {
                    playback.commands.send(PlaybackCommand::Load(pitch.clone()))?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                break;
            }
        }
    }

    let _ = playback.stop.send(());
    playback.handle.await?;
    Ok(())
}
