//! Camera error taxonomy

use hcnet_sdk::SdkError;
use thiserror::Error;

/// Errors surfaced to consumers of the camera adapter.
///
/// Session-lifecycle errors (auth, network, timeout) come out of connect and
/// reconnect; per-call errors (not connected, unsupported command) come out
/// of stream, snapshot and PTZ operations without tearing down the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Bad credentials. Terminal until the configuration is corrected.
    #[error("camera rejected the credentials")]
    Auth,

    /// Device unreachable or connection reset. Recoverable via reconnect.
    #[error("camera unreachable: {0}")]
    Network(String),

    /// SDK call exceeded its deadline. Recoverable via reconnect.
    #[error("camera operation timed out")]
    Timeout,

    /// Operation attempted while the session is not in `Connected` state
    #[error("camera session is not connected")]
    NotConnected,

    /// PTZ command the camera model does not implement
    #[error("command not supported by this camera model")]
    UnsupportedCommand,

    /// Configuration rejected before any SDK call was made
    #[error("invalid camera configuration: {0}")]
    Config(String),

    /// Vendor buffer that is not the image format it claims to be
    #[error("camera returned a malformed image: {0}")]
    BadImage(String),

    /// SDK failure outside the categories above
    #[error("camera SDK error: {0}")]
    Sdk(SdkError),

    /// Worker task running a blocking SDK call was cancelled or panicked
    #[error("camera worker failed: {0}")]
    Worker(String),
}

impl From<SdkError> for CameraError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::BadCredentials(_) => CameraError::Auth,
            SdkError::ConnectFailed(code) => {
                CameraError::Network(format!("SDK error {code}"))
            }
            SdkError::Timeout(_) => CameraError::Timeout,
            SdkError::Unsupported(_) => CameraError::UnsupportedCommand,
            other => CameraError::Sdk(other),
        }
    }
}

impl CameraError {
    /// Whether reconnecting can clear this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CameraError::Network(_) | CameraError::Timeout | CameraError::NotConnected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcnet_sdk::error_code;

    #[test]
    fn test_sdk_error_mapping() {
        assert_eq!(
            CameraError::from(SdkError::BadCredentials(error_code::PASSWORD_ERROR)),
            CameraError::Auth
        );
        assert_eq!(
            CameraError::from(SdkError::Timeout(error_code::RECV_TIMEOUT)),
            CameraError::Timeout
        );
        assert_eq!(
            CameraError::from(SdkError::Unsupported(error_code::NOT_SUPPORTED)),
            CameraError::UnsupportedCommand
        );
        assert!(matches!(
            CameraError::from(SdkError::ConnectFailed(error_code::CONNECT_FAILED)),
            CameraError::Network(_)
        ));
    }

    #[test]
    fn test_auth_is_not_recoverable() {
        assert!(!CameraError::Auth.is_recoverable());
        assert!(CameraError::Timeout.is_recoverable());
        assert!(CameraError::Network("reset".into()).is_recoverable());
    }
}
