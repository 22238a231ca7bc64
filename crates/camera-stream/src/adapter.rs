//! Stream handle lifecycle against the SDK preview surface

use std::sync::Arc;

use camera_session::{CameraError, SessionManager};
use hcnet_sdk::{CameraSdk, PreviewHandle, SdkError, StreamType};
use tracing::{debug, warn};

/// Opens and closes preview streams for connected sessions
pub struct StreamAdapter {
    sdk: Arc<dyn CameraSdk>,
}

impl StreamAdapter {
    pub fn new(sdk: Arc<dyn CameraSdk>) -> Self {
        Self { sdk }
    }

    /// Open a live preview on the session's configured channel. Fails with
    /// `NotConnected` unless the session is connected; a network failure
    /// while opening marks the session failed.
    pub async fn open_stream(
        &self,
        session: &SessionManager,
        stream: StreamType,
    ) -> Result<StreamHandle, CameraError> {
        let token = session.token().await?;
        let channel = session.config().channel;

        let sdk = Arc::clone(&self.sdk);
        let result =
            tokio::task::spawn_blocking(move || sdk.start_preview(token, channel, stream))
                .await
                .map_err(|e| CameraError::Worker(e.to_string()))?;

        match result {
            Ok(preview) => {
                debug!(channel, preview = preview.0, "preview stream opened");
                Ok(StreamHandle {
                    sdk: Arc::clone(&self.sdk),
                    preview: Some(preview),
                    channel,
                    stream,
                })
            }
            Err(err @ (SdkError::ConnectFailed(_) | SdkError::Timeout(_))) => {
                session.mark_failed().await;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// One live preview stream. Closing is idempotent; dropping an active handle
/// releases the SDK preview so no exit path leaks it.
pub struct StreamHandle {
    sdk: Arc<dyn CameraSdk>,
    preview: Option<PreviewHandle>,
    channel: u8,
    stream: StreamType,
}

impl StreamHandle {
    /// Whether the underlying SDK preview is still held
    pub fn is_active(&self) -> bool {
        self.preview.is_some()
    }

    /// Channel the stream was opened on
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Main or sub stream
    pub fn stream_type(&self) -> StreamType {
        self.stream
    }

    /// Raw preview handle while active, for the frame pump
    pub(crate) fn preview(&self) -> Option<PreviewHandle> {
        self.preview
    }

    /// Stop the preview. Second and later calls are no-ops. A stale SDK
    /// handle (already released by logout) counts as closed.
    pub async fn close(&mut self) -> Result<(), CameraError> {
        let Some(preview) = self.preview.take() else {
            return Ok(());
        };

        let sdk = Arc::clone(&self.sdk);
        let result = tokio::task::spawn_blocking(move || sdk.stop_preview(preview))
            .await
            .map_err(|e| CameraError::Worker(e.to_string()))?;

        match result {
            Ok(()) => {
                debug!(preview = preview.0, "preview stream closed");
                Ok(())
            }
            Err(SdkError::InvalidHandle) => {
                debug!(preview = preview.0, "preview already released");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if let Some(preview) = self.preview.take() {
            warn!(preview = preview.0, "stream handle dropped while active");
            if let Err(err) = self.sdk.stop_preview(preview) {
                warn!(preview = preview.0, error = %err, "failed to release preview");
            }
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
    async fn test_open_then_close_releases_preview() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        let adapter = StreamAdapter::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);

        let mut handle = adapter
            .open_stream(&session, StreamType::Main)
            .await
            .unwrap();
        assert!(handle.is_active());
        assert_eq!(sdk.open_preview_count(), 1);

        handle.close().await.unwrap();
        assert!(!handle.is_active());
        assert_eq!(sdk.open_preview_count(), 0);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        let adapter = StreamAdapter::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);

        let mut handle = adapter
            .open_stream(&session, StreamType::Main)
            .await
            .unwrap();
        handle.close().await.unwrap();
        handle.close().await.unwrap();
        assert_eq!(sdk.open_preview_count(), 0);
    }

    #[tokio::test]
    async fn test_open_without_session_fails_not_connected() {
        let sdk = Arc::new(MockSdk::new());
        let config = CameraConfig::new("10.0.0.5", "admin");
        let session =
            SessionManager::new(config, Arc::clone(&sdk) as Arc<dyn CameraSdk>).unwrap();
        let adapter = StreamAdapter::new(sdk as Arc<dyn CameraSdk>);

        let result = adapter.open_stream(&session, StreamType::Main).await;
        assert!(matches!(result, Err(CameraError::NotConnected)));
    }

    #[tokio::test]
    async fn test_drop_releases_active_preview() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        let adapter = StreamAdapter::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);

        {
            let _handle = adapter
                .open_stream(&session, StreamType::Main)
                .await
                .unwrap();
            assert_eq!(sdk.open_preview_count(), 1);
        }
        assert_eq!(sdk.open_preview_count(), 0);
    }

    #[tokio::test]
    async fn test_close_after_logout_is_clean() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;
        let adapter = StreamAdapter::new(Arc::clone(&sdk) as Arc<dyn CameraSdk>);

        let mut handle = adapter
            .open_stream(&session, StreamType::Main)
            .await
            .unwrap();

        // Logout releases the preview on the SDK side first
        session.disconnect().await;
        assert_eq!(sdk.open_preview_count(), 0);

        handle.close().await.unwrap();
        assert!(!handle.is_active());
    }
}
