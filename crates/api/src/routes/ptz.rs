//! PTZ service call routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use camera_ptz::PtzDirection;

use crate::{ApiError, AppState};

fn default_speed() -> u32 {
    4
}

/// PTZ move request. With `duration_ms` the move is a single nudge
/// (start, hold, stop); without it the motion continues until a stop call.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: PtzDirection,
    #[serde(default = "default_speed")]
    pub speed: u32,
    pub duration_ms: Option<u64>,
}

/// PTZ stop request
#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub direction: PtzDirection,
}

/// Preset recall request
#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    pub id: u8,
}

/// Acknowledgement for fire-and-forget PTZ calls
#[derive(Debug, Serialize)]
pub struct PtzResponse {
    pub id: String,
    pub ok: bool,
}

/// Start or nudge a PTZ motion
pub async fn move_camera(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<PtzResponse>, ApiError> {
    let handle = state.camera(&id)?;
    match request.duration_ms {
        Some(ms) => {
            handle
                .ptz()
                .nudge(
                    handle.session(),
                    request.direction,
                    request.speed,
                    Duration::from_millis(ms),
                )
                .await?
        }
        None => {
            handle
                .ptz()
                .move_start(handle.session(), request.direction, request.speed)
                .await?
        }
    }
    Ok(Json(PtzResponse { id, ok: true }))
}

/// Stop a continuous PTZ motion
pub async fn stop_camera(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<StopRequest>,
) -> Result<Json<PtzResponse>, ApiError> {
    let handle = state.camera(&id)?;
    handle
        .ptz()
        .move_stop(handle.session(), request.direction)
        .await?;
    Ok(Json(PtzResponse { id, ok: true }))
}

/// Drive the camera to a stored preset
pub async fn goto_preset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PresetRequest>,
) -> Result<Json<PtzResponse>, ApiError> {
    let handle = state.camera(&id)?;
    handle
        .ptz()
        .goto_preset(handle.session(), request.id)
        .await?;
    Ok(Json(PtzResponse { id, ok: true }))
}

// Handlers are called directly here: the rate-limited router needs peer
// connect info that only a bound listener provides.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CameraEntry;
    use crate::{camera_error_status, AppState};
    use axum::http::StatusCode;
    use camera_session::{CameraConfig, CameraError};
    use hcnet_sdk::ffi::ptz_cmd;
    use hcnet_sdk::{CameraSdk, MockSdk};
    use std::sync::Arc;

    async fn connected_state(sdk: &Arc<MockSdk>) -> Arc<AppState> {
        let cameras = vec![CameraEntry {
            id: Some("front-door".into()),
            camera: CameraConfig::new("10.0.0.5", "admin"),
        }];
        let state = Arc::new(
            AppState::new(cameras, Arc::clone(sdk) as Arc<dyn CameraSdk>).unwrap(),
        );
        state
            .camera("front-door")
            .unwrap()
            .session()
            .connect()
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_move_without_duration_starts_motion() {
        let sdk = Arc::new(MockSdk::new());
        let state = connected_state(&sdk).await;

        let response = move_camera(
            State(state),
            Path("front-door".into()),
            Json(MoveRequest {
                direction: PtzDirection::Left,
                speed: 4,
                duration_ms: None,
            }),
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert_eq!(sdk.last_ptz_call(), Some((ptz_cmd::PAN_LEFT, 0, 4)));
    }

    #[tokio::test]
    async fn test_move_with_duration_ends_stopped() {
        let sdk = Arc::new(MockSdk::new());
        let state = connected_state(&sdk).await;

        move_camera(
            State(state),
            Path("front-door".into()),
            Json(MoveRequest {
                direction: PtzDirection::Up,
                speed: 5,
                duration_ms: Some(5),
            }),
        )
        .await
        .unwrap();

        // Last call is the stop half of the nudge
        assert_eq!(sdk.last_ptz_call(), Some((ptz_cmd::TILT_UP, 1, 1)));
    }

    #[tokio::test]
    async fn test_preset_recall_through_handler() {
        let sdk = Arc::new(MockSdk::new());
        let state = connected_state(&sdk).await;

        goto_preset(
            State(state),
            Path("front-door".into()),
            Json(PresetRequest { id: 7 }),
        )
        .await
        .unwrap();

        assert_eq!(sdk.last_ptz_call(), Some((ptz_cmd::GOTO_PRESET, 0, 7)));
    }

    #[tokio::test]
    async fn test_fixed_lens_model_maps_to_unprocessable() {
        let sdk = Arc::new(MockSdk::new());
        sdk.set_ptz_supported(false);
        let state = connected_state(&sdk).await;

        let err = stop_camera(
            State(state),
            Path("front-door".into()),
            Json(StopRequest {
                direction: PtzDirection::Right,
            }),
        )
        .await
        .unwrap_err();

        match err {
            crate::ApiError::Camera(ref inner) => {
                assert_eq!(*inner, CameraError::UnsupportedCommand);
                assert_eq!(
                    camera_error_status(inner),
                    StatusCode::UNPROCESSABLE_ENTITY
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
