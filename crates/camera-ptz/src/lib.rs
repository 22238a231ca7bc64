//! PTZ Controller
//!
//! Translates discrete pan/tilt/zoom directives into single SDK command
//! invocations. Stateless between calls: each call is one fire-and-forget
//! round trip with no queuing or ordering guarantee beyond per-call
//! completion. Requires a connected session; per-call failures never tear
//! the session down.

use std::sync::Arc;
use std::time::Duration;

use camera_session::{CameraError, SessionManager};
use hcnet_sdk::ffi::ptz_cmd;
use hcnet_sdk::{CameraSdk, PtzAction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slowest PTZ speed the SDK accepts
pub const MIN_SPEED: u32 = 1;
/// Fastest PTZ speed the SDK accepts
pub const MAX_SPEED: u32 = 7;

/// Motion directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PtzDirection {
    Up,
    Down,
    Left,
    Right,
    ZoomIn,
    ZoomOut,
}

impl PtzDirection {
    /// SDK command code for this direction
    pub fn command(self) -> u32 {
        match self {
            PtzDirection::Up => ptz_cmd::TILT_UP,
            PtzDirection::Down => ptz_cmd::TILT_DOWN,
            PtzDirection::Left => ptz_cmd::PAN_LEFT,
            PtzDirection::Right => ptz_cmd::PAN_RIGHT,
            PtzDirection::ZoomIn => ptz_cmd::ZOOM_IN,
            PtzDirection::ZoomOut => ptz_cmd::ZOOM_OUT,
        }
    }
}

/// Transient PTZ directive; not persisted anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PtzCommand {
    /// Start or continue moving in a direction
    Move { direction: PtzDirection, speed: u32 },
    /// Stop motion in a direction
    Stop { direction: PtzDirection },
    /// Drive to a stored preset position
    Preset { id: u8 },
}

/// Clamp a requested speed into the SDK's accepted range
pub fn clamp_speed(speed: u32) -> u32 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Issues PTZ commands against connected sessions
pub struct PtzController {
    sdk: Arc<dyn CameraSdk>,
}

impl PtzController {
    pub fn new(sdk: Arc<dyn CameraSdk>) -> Self {
        Self { sdk }
    }

    /// Execute one PTZ directive
    pub async fn execute(
        &self,
        session: &SessionManager,
        command: PtzCommand,
    ) -> Result<(), CameraError> {
        match command {
            PtzCommand::Move { direction, speed } => {
                self.move_start(session, direction, speed).await
            }
            PtzCommand::Stop { direction } => self.move_stop(session, direction).await,
            PtzCommand::Preset { id } => self.goto_preset(session, id).await,
        }
    }

    /// Begin continuous motion in a direction
    pub async fn move_start(
        &self,
        session: &SessionManager,
        direction: PtzDirection,
        speed: u32,
    ) -> Result<(), CameraError> {
        self.control(session, direction, PtzAction::Start, clamp_speed(speed))
            .await
    }

    /// Stop motion in a direction
    pub async fn move_stop(
        &self,
        session: &SessionManager,
        direction: PtzDirection,
    ) -> Result<(), CameraError> {
        self.control(session, direction, PtzAction::Stop, MIN_SPEED)
            .await
    }

    /// Single-shot move: start, hold for `duration`, stop. Matches the
    /// original integration's one-call pan/tilt semantics.
    pub async fn nudge(
        &self,
        session: &SessionManager,
        direction: PtzDirection,
        speed: u32,
        duration: Duration,
    ) -> Result<(), CameraError> {
        self.move_start(session, direction, speed).await?;
        tokio::time::sleep(duration).await;
        self.move_stop(session, direction).await
    }

    /// Drive the camera to a stored preset
    pub async fn goto_preset(
        &self,
        session: &SessionManager,
        preset: u8,
    ) -> Result<(), CameraError> {
        let token = session.token().await?;
        let channel = session.config().channel;

        let sdk = Arc::clone(&self.sdk);
        tokio::task::spawn_blocking(move || sdk.ptz_preset(token, channel, preset))
            .await
            .map_err(|e| CameraError::Worker(e.to_string()))??;

        debug!(channel, preset, "ptz preset recalled");
        Ok(())
    }

    async fn control(
        &self,
        session: &SessionManager,
        direction: PtzDirection,
        action: PtzAction,
        speed: u32,
    ) -> Result<(), CameraError> {
        let token = session.token().await?;
        let channel = session.config().channel;
        let command = direction.command();

        let sdk = Arc::clone(&self.sdk);
        tokio::task::spawn_blocking(move || {
            sdk.ptz_control(token, channel, command, action, speed)
        })
        .await
        .map_err(|e| CameraError::Worker(e.to_string()))??;

        debug!(channel, ?direction, ?action, speed, "ptz command sent");
        Ok(())
    }
}
