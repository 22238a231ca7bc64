//! Camera lifecycle, status, stream source and snapshot routes

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use camera_session::SessionState;
use hcnet_sdk::StreamType;

use crate::{ApiError, AppState};

/// Stream selector query (`?stream=sub`), defaulting to the main stream
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub stream: StreamParam,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamParam {
    #[default]
    Main,
    Sub,
}

impl From<StreamParam> for StreamType {
    fn from(param: StreamParam) -> Self {
        match param {
            StreamParam::Main => StreamType::Main,
            StreamParam::Sub => StreamType::Sub,
        }
    }
}

/// Summary of one camera
#[derive(Debug, Serialize)]
pub struct CameraSummary {
    pub id: String,
    pub host: String,
    pub state: SessionState,
    pub available: bool,
}

/// Response for the camera list endpoint
#[derive(Debug, Serialize)]
pub struct CameraListResponse {
    pub cameras: Vec<CameraSummary>,
}

/// Detailed status of one camera
#[derive(Debug, Serialize)]
pub struct CameraStatusResponse {
    pub id: String,
    pub host: String,
    pub channel: u8,
    pub state: SessionState,
    pub available: bool,
    pub serial_number: Option<String>,
    pub channel_count: Option<u8>,
}

/// Stream source for the host media pipeline
#[derive(Debug, Serialize)]
pub struct StreamSourceResponse {
    pub id: String,
    pub url: String,
}

/// List configured cameras and their states
pub async fn list(State(state): State<Arc<AppState>>) -> Json<CameraListResponse> {
    let mut cameras = Vec::with_capacity(state.registry.len());
    for handle in state.registry.iter() {
        let session_state = handle.state().await;
        cameras.push(CameraSummary {
            id: handle.id().to_string(),
            host: handle.session().config().host.clone(),
            state: session_state,
            available: session_state.is_available(),
        });
    }
    Json(CameraListResponse { cameras })
}

/// Setup hook: log in to the camera
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CameraStatusResponse>, ApiError> {
    let handle = state.camera(&id)?;
    handle.session().connect().await?;
    status_of(handle.as_ref()).await.map(Json)
}

/// Teardown hook: log out and release everything
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CameraStatusResponse>, ApiError> {
    let handle = state.camera(&id)?;
    handle.session().disconnect().await;
    status_of(handle.as_ref()).await.map(Json)
}

/// Entity availability and device details
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CameraStatusResponse>, ApiError> {
    let handle = state.camera(&id)?;
    status_of(handle.as_ref()).await.map(Json)
}

/// RTSP stream source for the camera entity
pub async fn stream_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<Json<StreamSourceResponse>, ApiError> {
    let handle = state.camera(&id)?;
    if !handle.is_available().await {
        return Err(ApiError::from(camera_session::CameraError::NotConnected));
    }
    let url = camera_stream::stream_url(handle.session().config(), query.stream.into());
    Ok(Json(StreamSourceResponse { id, url }))
}

/// Still image for the camera entity
pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.camera(&id)?;
    let bytes = handle.snapshot().snapshot(handle.session()).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

async fn status_of(
    handle: &crate::registry::CameraHandle,
) -> Result<CameraStatusResponse, ApiError> {
    let config = handle.session().config();
    let session_state = handle.state().await;
    let device = handle.session().device_info().await;
    Ok(CameraStatusResponse {
        id: handle.id().to_string(),
        host: config.host.clone(),
        channel: config.channel,
        state: session_state,
        available: session_state.is_available(),
        serial_number: device.as_ref().map(|d| d.serial_number.clone()),
        channel_count: device.as_ref().map(|d| d.channel_count),
    })
}
