//! Snapshot Fetcher
//!
//! Single synchronous JPEG round trip per call, no caching. The blocking
//! SDK capture runs on a worker and is wrapped in a deadline so a wedged
//! device surfaces as a timeout instead of stalling the caller forever.

use std::sync::Arc;
use std::time::Duration;

use camera_session::{CameraError, SessionManager};
use hcnet_sdk::CameraSdk;
use image::ImageFormat;
use tracing::{debug, warn};

/// Deadline applied to one capture round trip
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches still images from connected sessions
pub struct SnapshotFetcher {
    sdk: Arc<dyn CameraSdk>,
    timeout: Duration,
}

impl SnapshotFetcher {
    pub fn new(sdk: Arc<dyn CameraSdk>) -> Self {
        Self {
            sdk,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-capture deadline
    pub fn with_timeout(sdk: Arc<dyn CameraSdk>, timeout: Duration) -> Self {
        Self { sdk, timeout }
    }

    /// Capture one JPEG still from the session's configured channel.
    ///
    /// Fails with `NotConnected` unless the session is connected, `Timeout`
    /// if the deadline elapses, and `BadImage` if the vendor buffer is not
    /// actually JPEG. Failures here never tear the session down.
    pub async fn snapshot(&self, session: &SessionManager) -> Result<Vec<u8>, CameraError> {
        let token = session.token().await?;
        let channel = session.config().channel;

        let sdk = Arc::clone(&self.sdk);
        let capture = tokio::task::spawn_blocking(move || sdk.capture_jpeg(token, channel));

        let bytes = match tokio::time::timeout(self.timeout, capture).await {
            Ok(joined) => joined.map_err(|e| CameraError::Worker(e.to_string()))??,
            Err(_) => {
                warn!(channel, timeout_ms = self.timeout.as_millis() as u64, "snapshot timed out");
                return Err(CameraError::Timeout);
            }
        };

        match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => {
                debug!(channel, size = bytes.len(), "snapshot captured");
                Ok(bytes)
            }
            Ok(other) => Err(CameraError::BadImage(format!(
                "expected JPEG, got {other:?}"
            ))),
            Err(err) => Err(CameraError::BadImage(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_session::CameraConfig;
    use hcnet_sdk::MockSdk;

    async fn connected_session(sdk: &Arc<MockSdk>) -> SessionManager {
        let config = CameraConfig::new("10.0.0.5", "admin");
        let session =
            SessionManager::new(config, Arc::clone(sdk) as Arc<dyn CameraSdk>).unwrap();
        session.connect().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_snapshot_returns_jpeg() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        let fetcher = SnapshotFetcher::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);

        let bytes = fetcher.snapshot(&session).await.unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_snapshot_on_never_connected_session_fails() {
        let sdk = Arc::new(MockSdk::new());
        let config = CameraConfig::new("10.0.0.5", "admin");
        let session =
            SessionManager::new(config, Arc::clone(&sdk) as Arc<dyn CameraSdk>).unwrap();
        let fetcher = SnapshotFetcher::new(sdk as Arc<dyn CameraSdk>);

        let err = fetcher.snapshot(&session).await.unwrap_err();
        assert_eq!(err, CameraError::NotConnected);
    }

    #[tokio::test]
    async fn test_snapshot_on_failed_session_is_not_connected() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        session.mark_failed().await;

        let fetcher = SnapshotFetcher::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);
        let err = fetcher.snapshot(&session).await.unwrap_err();
        assert_eq!(err, CameraError::NotConnected);
    }

    #[tokio::test]
    async fn test_malformed_vendor_buffer_is_bad_image() {
        let sdk = Arc::new(MockSdk::new());
        sdk.set_snapshot(b"not a jpeg at all".to_vec());
        let session = connected_session(&sdk).await;

        let fetcher = SnapshotFetcher::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);
        let err = fetcher.snapshot(&session).await.unwrap_err();
        assert!(matches!(err, CameraError::BadImage(_)));
        // Per-call failure leaves the session connected
        assert!(session.is_connected().await);
    }

    #[tokio::test]
    async fn test_capture_fault_does_not_tear_down_session() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        sdk.inject_fault(hcnet_sdk::SdkError::Timeout(
            hcnet_sdk::error_code::RECV_TIMEOUT,
        ));

        let fetcher = SnapshotFetcher::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);
        let err = fetcher.snapshot(&session).await.unwrap_err();
        assert_eq!(err, CameraError::Timeout);
        assert!(session.is_connected().await);

        // The next capture succeeds without reconnecting
        fetcher.snapshot(&session).await.unwrap();
    }
}
