//! Pull-based frame channel
//!
//! The vendor SDK pushes stream data through callbacks; consumers here get
//! an explicit pull-based sequence instead. A worker thread anchors a
//! preview, captures JPEG frames at the requested rate and feeds a bounded
//! channel. The sequence is lazy and restartable: drop it and open a new
//! one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camera_session::{CameraError, SessionManager};
use hcnet_sdk::{CameraSdk, StreamType};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Frames to buffer before the producer blocks
const FRAME_CHANNEL_CAPACITY: usize = 8;
/// Consecutive capture failures before the stream gives up; the receiver
/// then sees end-of-stream and decides whether to reopen
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// One captured frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Encoded JPEG bytes
    pub jpeg: Vec<u8>,
    /// Monotonic frame counter within this stream
    pub sequence: u32,
    /// Capture wall-clock time (milliseconds since epoch)
    pub timestamp_ms: u64,
}

/// Pull-based sequence of frames from one camera channel
pub struct FrameStream {
    receiver: mpsc::Receiver<VideoFrame>,
    shutdown: Arc<AtomicBool>,
}

impl FrameStream {
    /// Start pulling frames from a connected session at `fps` frames per
    /// second. Fails with `NotConnected` unless the session is connected.
    pub async fn open(
        session: &SessionManager,
        sdk: Arc<dyn CameraSdk>,
        fps: u32,
    ) -> Result<Self, CameraError> {
        let token = session.token().await?;
        let channel = session.config().channel;
        let fps = fps.max(1);

        // Anchor a preview for the lifetime of the stream, as the original
        // capture path does
        let preview = {
            let sdk = Arc::clone(&sdk);
            tokio::task::spawn_blocking(move || {
                sdk.start_preview(token, channel, StreamType::Main)
            })
            .await
            .map_err(|e| CameraError::Worker(e.to_string()))??
        };

        let (tx, rx) = mpsc::channel::<VideoFrame>(FRAME_CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        std::thread::spawn(move || {
            let interval = Duration::from_micros(1_000_000 / fps as u64);
            let mut sequence: u32 = 0;
            let mut failures: u32 = 0;

            while !shutdown_flag.load(Ordering::SeqCst) {
                match sdk.capture_jpeg(token, channel) {
                    Ok(jpeg) => {
                        failures = 0;
                        let timestamp_ms = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .map(|d| d.as_millis() as u64)
                            .unwrap_or(0);
                        let frame = VideoFrame {
                            jpeg,
                            sequence,
                            timestamp_ms,
                        };
                        sequence = sequence.wrapping_add(1);

                        if tx.blocking_send(frame).is_err() {
                            debug!(channel, "frame receiver dropped");
                            break;
                        }
                    }
                    Err(err) => {
                        failures += 1;
                        warn!(channel, failures, error = %err, "frame capture failed");
                        if failures >= MAX_CONSECUTIVE_FAILURES {
                            error!(channel, "giving up on frame stream");
                            break;
                        }
                    }
                }
                std::thread::sleep(interval);
            }

            if let Err(err) = sdk.stop_preview(preview) {
                debug!(preview = preview.0, error = %err, "preview already released");
            }
        });

        Ok(Self { receiver: rx, shutdown })
    }

    /// Receive the next frame. `None` means the stream ended (shutdown,
    /// receiver lag, or repeated capture failure) and must be reopened.
    pub async fn next(&mut self) -> Option<VideoFrame> {
        self.receiver.recv().await
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
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
    async fn test_frames_arrive_with_increasing_sequence() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;

        let mut stream =
            FrameStream::open(&session, Arc::clone(&sdk) as Arc<dyn CameraSdk>, 100)
                .await
                .unwrap();

        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(&first.jpeg[..2], &[0xFF, 0xD8]);
        assert!(second.sequence > first.sequence);
    }

    #[tokio::test]
    async fn test_open_requires_connected_session() {
        let sdk = Arc::new(MockSdk::new());
        let config = CameraConfig::new("10.0.0.5", "admin");
        let session =
            SessionManager::new(config, Arc::clone(&sdk) as Arc<dyn CameraSdk>).unwrap();

        let result = FrameStream::open(&session, sdk as Arc<dyn CameraSdk>, 10).await;
        assert!(matches!(result, Err(CameraError::NotConnected)));
    }

    #[tokio::test]
    async fn test_drop_releases_preview() {
        let sdk = Arc::new(MockSdk::new());
        let session = connected_session(&sdk).await;

        let stream = FrameStream::open(&session, Arc::clone(&sdk) as Arc<dyn CameraSdk>, 100)
            .await
            .unwrap();
        assert_eq!(sdk.open_preview_count(), 1);

        drop(stream);
        // Worker notices shutdown on its next tick
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sdk.open_preview_count(), 0);
    }
}
