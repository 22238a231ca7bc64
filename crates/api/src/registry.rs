//! Per-camera handle bundle and lookup registry

use std::collections::HashMap;
use std::sync::Arc;

use camera_ptz::PtzController;
use camera_session::{CameraConfig, CameraError, SessionManager, SessionState};
use camera_snapshot::SnapshotFetcher;
use camera_stream::StreamAdapter;
use hcnet_sdk::CameraSdk;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// One configured camera as it appears in the settings file
#[derive(Debug, Clone, Deserialize)]
pub struct CameraEntry {
    /// Stable identifier used in API paths; generated when omitted
    pub id: Option<String>,
    #[serde(flatten)]
    pub camera: CameraConfig,
}

/// Everything the API needs for one camera. The session manager underlies
/// the three adapters; they share the same SDK backend.
pub struct CameraHandle {
    id: String,
    session: SessionManager,
    stream: StreamAdapter,
    ptz: PtzController,
    snapshot: SnapshotFetcher,
}

impl CameraHandle {
    pub fn new(
        id: String,
        config: CameraConfig,
        sdk: Arc<dyn CameraSdk>,
    ) -> Result<Self, CameraError> {
        let session = SessionManager::new(config, Arc::clone(&sdk))?;
        Ok(Self {
            id,
            session,
            stream: StreamAdapter::new(Arc::clone(&sdk)),
            ptz: PtzController::new(Arc::clone(&sdk)),
            snapshot: SnapshotFetcher::new(sdk),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn stream(&self) -> &StreamAdapter {
        &self.stream
    }

    pub fn ptz(&self) -> &PtzController {
        &self.ptz
    }

    pub fn snapshot(&self) -> &SnapshotFetcher {
        &self.snapshot
    }

    /// Host-platform availability of this camera's entity
    pub async fn is_available(&self) -> bool {
        self.session.state().await.is_available()
    }

    pub async fn state(&self) -> SessionState {
        self.session.state().await
    }
}

/// Lookup table of configured cameras. Built once at startup; per-camera
/// state lives inside each handle's session manager.
pub struct CameraRegistry {
    cameras: HashMap<String, Arc<CameraHandle>>,
}

impl CameraRegistry {
    /// Build handles for every configured camera
    pub fn from_entries(
        entries: Vec<CameraEntry>,
        sdk: Arc<dyn CameraSdk>,
    ) -> Result<Self, CameraError> {
        let mut cameras = HashMap::with_capacity(entries.len());
        for entry in entries {
            let id = entry
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            info!(camera = %id, host = %entry.camera.host, "registering camera");
            let handle = CameraHandle::new(id.clone(), entry.camera, Arc::clone(&sdk))?;
            cameras.insert(id, Arc::new(handle));
        }
        Ok(Self { cameras })
    }

    pub fn get(&self, id: &str) -> Option<Arc<CameraHandle>> {
        self.cameras.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CameraHandle>> {
        self.cameras.values()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
