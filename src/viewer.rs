//! Viewer render target.
//!
//! [`ViewerScene`] is a [`RenderTarget`] that only remembers what should be drawn. Running
//! [`serve`] pushes the scene, as a JSON [`ViewerFrame`], to every connected websocket
//! client 60 times per second; the browser side does the actual drawing.
//!
//! The scene is cheap to clone (shared internals), so several controllers can draw into
//! the same scene, e.g. to overlay multiple pitches.
//!
//! # Examples
//!
//! ```
//! use pitch_playback::{
//!     math::Vec3,
//!     render::{RenderTarget, VisualKind},
//!     viewer::ViewerScene,
//! };
//!
//! let mut scene = ViewerScene::new();
//! assert_eq!(scene.objects_count(), 0, "the scene should be empty at init");
//!
//! let ball = scene.create_visual_object(VisualKind::Ball { color: "#FF0000" });
//! scene.set_position(ball, Vec3::new(0., 6., 0.));
//! assert_eq!(scene.objects_count(), 1);
//!
//! scene.remove(ball);
//! assert_eq!(scene.objects_count(), 0);
//! ```

use futures_util::{stream::FusedStream, SinkExt};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fmt, io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::Notify,
};
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, warn};

use crate::{
    host::FRAME_PERIOD,
    math::{Quat, Vec3},
    render::{RenderTarget, VisualKind},
    IgnoreMutexErr,
};

/// default viewer ip
const VIEWER_IP: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

/// default viewer port
const VIEWER_PORT: u16 = 8282;

pub const VIEWER_ADDR: SocketAddrV4 = SocketAddrV4::new(VIEWER_IP, VIEWER_PORT);

/// A shape that can be drawn on the viewer clients
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ViewerObject {
    Ball {
        color: &'static str,
        pos: Vec3,
        orientation: Quat,
    },
    TrailMarker {
        pos: Vec3,
    },
}

impl ViewerObject {
    fn new(kind: VisualKind) -> Self {
        match kind {
            VisualKind::Ball { color } => ViewerObject::Ball {
                color,
                pos: Vec3::zero(),
                orientation: Quat::identity(),
            },
            VisualKind::TrailMarker => ViewerObject::TrailMarker { pos: Vec3::zero() },
        }
    }

    fn pos_mut(&mut self) -> &mut Vec3 {
        match self {
            ViewerObject::Ball { pos, .. } | ViewerObject::TrailMarker { pos } => pos,
        }
    }
}

/// A frame sent to each viewer client. It contains all the objects to be drawn during the frame.
#[derive(Serialize, Debug, Clone)]
pub struct ViewerFrame {
    /// scene clock, seconds
    time: f64,
    objects: Vec<ViewerObject>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerHandle(usize);

#[derive(Clone, Debug)]
pub struct ViewerScene {
    objects: Arc<Mutex<BTreeMap<ViewerHandle, ViewerObject>>>,
    next_handle: Arc<AtomicUsize>,
    epoch: Instant,
}

impl Default for ViewerScene {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerScene {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            next_handle: Arc::new(AtomicUsize::new(0)),
            epoch: Instant::now(),
        }
    }

    /// Returns the number of `ViewerObject`s which should currently be drawn.
    pub fn objects_count(&self) -> usize {
        self.objects.lock().unwrap_ignore_poison().len()
    }

    pub fn object(&self, handle: ViewerHandle) -> Option<ViewerObject> {
        self.objects
            .lock()
            .unwrap_ignore_poison()
            .get(&handle)
            .cloned()
    }

    /// Returns a new `ViewerFrame` containing the `ViewerObject`s which should currently be drawn.
    pub fn make_frame(&self) -> ViewerFrame {
        ViewerFrame {
            time: self.now(),
            objects: self
                .objects
                .lock()
                .unwrap_ignore_poison()
                .values()
                .cloned()
                .collect(),
        }
    }

    fn update(&self, handle: ViewerHandle, f: impl FnOnce(&mut ViewerObject)) {
        match self.objects.lock().unwrap_ignore_poison().get_mut(&handle) {
            Some(object) => f(object),
            None => debug!(?handle, "update of an object that is not drawn anymore"),
        }
    }
}

impl RenderTarget for ViewerScene {
    type Handle = ViewerHandle;

    fn create_visual_object(&mut self, kind: VisualKind) -> Self::Handle {
        let handle = ViewerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.objects
            .lock()
            .unwrap_ignore_poison()
            .insert(handle, ViewerObject::new(kind));
        handle
    }

    fn set_position(&mut self, handle: Self::Handle, pos: Vec3) {
        self.update(handle, |object| *object.pos_mut() = pos);
    }

    fn apply_rotation(&mut self, handle: Self::Handle, axis: Vec3, radians: f64) {
        self.update(handle, |object| {
            if let ViewerObject::Ball { orientation, .. } = object {
                // world axis: the new rotation goes on the left
                *orientation = (Quat::from_axis_angle(axis, radians) * *orientation).normalized();
            }
        });
    }

    fn remove(&mut self, handle: Self::Handle) {
        self.objects.lock().unwrap_ignore_poison().remove(&handle);
    }

    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

#[derive(Debug)]
pub enum ViewerError {
    Bind(io::Error),
    Handshake(tungstenite::Error),
    Send(tungstenite::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Bind(e) => write!(f, "couldn't bind the viewer listener: {e}"),
            ViewerError::Handshake(e) => write!(f, "websocket handshake failed: {e}"),
            ViewerError::Send(e) => write!(f, "couldn't send frame to viewer client: {e}"),
            ViewerError::Serialize(e) => write!(f, "couldn't serialize `ViewerFrame`: {e}"),
        }
    }
}

impl std::error::Error for ViewerError {}

/// Starts the viewer server and the new frame task. Returns the address actually bound,
/// which matters when `addr` asks for port 0.
pub async fn serve(scene: ViewerScene, addr: SocketAddr) -> Result<SocketAddr, ViewerError> {
    let listener = TcpListener::bind(addr).await.map_err(ViewerError::Bind)?;
    let local_addr = listener.local_addr().map_err(ViewerError::Bind)?;
    info!(%local_addr, "viewer listening");

    let new_frame_notify = Arc::new(Notify::new());

    let new_frame_notify_clone = new_frame_notify.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let scene = scene.clone();
            let notify = new_frame_notify_clone.clone();
            tokio::spawn(async move {
                if let Err(e) = accept_connection(scene, notify, stream).await {
                    warn!(error = %e, "viewer client dropped");
                }
            });
        }
    });

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(FRAME_PERIOD);
        loop {
            interval.tick().await;
            new_frame_notify.notify_waiters();
        }
    });

    Ok(local_addr)
}

async fn accept_connection(
    scene: ViewerScene,
    new_frame_notifier: Arc<Notify>,
    stream: TcpStream,
) -> Result<(), ViewerError> {
    let peer = stream.peer_addr().ok();
    let mut ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(ViewerError::Handshake)?;
    info!(?peer, "new viewer connection");

    while !ws_stream.is_terminated() {
        new_frame_notifier.notified().await;
        let json_encoded_frame =
            serde_json::to_string(&scene.make_frame()).map_err(ViewerError::Serialize)?;
        ws_stream
            .send(tungstenite::Message::text(json_encoded_frame))
            .await
            .map_err(ViewerError::Send)?;
    }
    Ok(())
}
