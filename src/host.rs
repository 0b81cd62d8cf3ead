//! Frame loop host.
//!
//! Owns a [`PlaybackController`] inside a tokio task, ticks it once per frame and applies
//! the commands sent by the UI between frames. Commands and ticks are handled by the same
//! task, so the controller never sees two calls at once.

use std::time::Duration;
use tokio::{
    select,
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        oneshot::{self, Sender},
    },
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    pitch::PitchParameters,
    playback::PlaybackController,
    render::RenderTarget,
};

/// ~60 frames per second
pub const FRAME_PERIOD: Duration = Duration::from_micros(16_667);

/// The operations the UI may ask for.
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    Load(PitchParameters),
    Pause,
    Resume,
    Replay(Option<PitchParameters>),
    SetTrailVisible(bool),
    Dispose,
}

/// Handles on a running playback loop.
pub struct PlaybackLoop<R: RenderTarget> {
    pub commands: UnboundedSender<PlaybackCommand>,
    pub stop: Sender<()>,
    /// resolves to the (disposed) controller once the loop is stopped
    pub handle: JoinHandle<PlaybackController<R>>,
}

fn apply_command<R: RenderTarget>(controller: &mut PlaybackController<R>, command: PlaybackCommand) {
    let result = match command {
        PlaybackCommand::Load(pitch) => controller.load(pitch).map(drop),
        PlaybackCommand::Replay(pitch) => controller.replay(pitch).map(drop),
        PlaybackCommand::Pause => {
            let now = controller.now();
            controller.pause(now);
            Ok(())
        }
        PlaybackCommand::Resume => {
            let now = controller.now();
            controller.resume(now);
            Ok(())
        }
        PlaybackCommand::SetTrailVisible(visible) => {
            controller.set_trail_visible(visible);
            Ok(())
        }
        PlaybackCommand::Dispose => {
            controller.dispose();
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!(error = %e, "playback command failed");
    }
}

async fn playback_loop<R: RenderTarget>(
    controller: &mut PlaybackController<R>,
    mut commands: UnboundedReceiver<PlaybackCommand>,
    frame_period: Duration,
) {
    let mut interval = tokio::time::interval(frame_period);
    loop {
        interval.tick().await; // first tick ticks immediately that's why it's at the beginning

        while let Ok(command) = commands.try_recv() {
            apply_command(controller, command);
        }
        let now = controller.now();
        controller.tick(now);
    }
}

pub fn launch_playback_loop<R>(
    mut controller: PlaybackController<R>,
    frame_period: Duration,
) -> PlaybackLoop<R>
where
    R: RenderTarget + Send + 'static,
    R::Handle: Send + 'static,
{
    let (command_sender, command_receiver) = mpsc::unbounded_channel();
    let (stop_sender, stop_receiver) = oneshot::channel();
    let handle = tokio::spawn(async move {
        select! {
            _ = playback_loop(&mut controller, command_receiver, frame_period) => {}
            _ = stop_receiver => {
                info!("playback loop received stop signal")
            }
        };

        controller.dispose();
        controller
    });
    PlaybackLoop {
        commands: command_sender,
        stop: stop_sender,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PlaybackConfig,
        math::Vec3,
        playback::{ArrivalReport, Phase},
        viewer::ViewerScene,
    };

    fn pitch() -> PitchParameters {
        PitchParameters {
            release_position: Vec3::new(0., 6., 0.),
            initial_velocity: Vec3::new(0., 0., -130.),
            acceleration: Vec3::new(0., -32.17, 0.),
            spin_rate: 2400.,
            spin_axis: 180.,
            pitch_type: "CH".into(),
            time_to_plate: None,
        }
    }

    #[tokio::test]
    async fn loop_drives_a_throw_to_the_plate() {
        let scene = ViewerScene::new();
        let mut controller = PlaybackController::new(scene.clone(), PlaybackConfig::default());
        let (arrived_sender, mut arrived_receiver) = mpsc::unbounded_channel::<ArrivalReport>();
        controller.on_arrived(move |report| {
            let _ = arrived_sender.send(report.clone());
        });

        let playback = launch_playback_loop(controller, Duration::from_millis(5));
        playback
            .commands
            .send(PlaybackCommand::Load(pitch()))
            .unwrap();

        let report = tokio::time::timeout(Duration::from_secs(3), arrived_receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.throw_id, 1);
        assert!((report.position.z + 60.5).abs() < 1e-9);
        assert!(scene.objects_count() >= 1, "ball stays for the display window");

        playback.stop.send(()).unwrap();
        let controller = playback.handle.await.unwrap();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(scene.objects_count(), 0);
    }

    #[tokio::test]
    async fn bad_commands_do_not_stop_the_loop() {
        let controller = PlaybackController::new(ViewerScene::new(), PlaybackConfig::default());
        let playback = launch_playback_loop(controller, Duration::from_millis(5));
        playback.commands.send(PlaybackCommand::Replay(None)).unwrap();
        playback.commands.send(PlaybackCommand::Load(pitch())).unwrap();
        playback.commands.send(PlaybackCommand::Pause).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        playback.stop.send(()).unwrap();
        let controller = playback.handle.await.unwrap();
        // the failed replay didn't prevent the load that followed
        assert_eq!(controller.current_pitch(), Some(&pitch()));
        assert_eq!(controller.phase(), Phase::Idle);
    }
}
