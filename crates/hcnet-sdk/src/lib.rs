//! HCNetSDK Call Surface
//!
//! This crate is the only place that knows about the proprietary Hikvision
//! network SDK. It exposes:
//! - `repr(C)` structures and PTZ command constants matching the vendor ABI
//! - the [`CameraSdk`] trait that the rest of the workspace programs against
//! - [`NativeSdk`], the real FFI-backed implementation (behind the
//!   `vendor-sdk` feature, since the closed-source library cannot be linked
//!   in CI)
//! - [`MockSdk`], an in-process backend with the same observable semantics,
//!   used by every test that would otherwise need a camera on the network

pub mod backend;
pub mod ffi;
pub mod mock;

#[cfg(feature = "vendor-sdk")]
pub use backend::NativeSdk;
pub use backend::{CameraSdk, DeviceInfo, LoginToken, PreviewHandle, PtzAction, StreamType};
pub use mock::MockSdk;

use thiserror::Error;

/// Raw HCNetSDK error codes this crate interprets. Everything else is
/// surfaced as [`SdkError::Raw`].
pub mod error_code {
    /// Wrong username or password
    pub const PASSWORD_ERROR: i32 = 1;
    /// SDK used before `NET_DVR_Init`
    pub const NOT_INITIALIZED: i32 = 3;
    /// Channel number out of range for the device
    pub const CHANNEL_ERROR: i32 = 4;
    /// TCP connection to the device failed
    pub const CONNECT_FAILED: i32 = 7;
    /// Device accepted the connection but a response never arrived
    pub const RECV_TIMEOUT: i32 = 10;
    /// Command not supported by this device model
    pub const NOT_SUPPORTED: i32 = 23;
}

/// Errors produced at the SDK boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdkError {
    #[error("invalid credentials (SDK error {0})")]
    BadCredentials(i32),

    #[error("device unreachable (SDK error {0})")]
    ConnectFailed(i32),

    #[error("SDK call timed out (SDK error {0})")]
    Timeout(i32),

    #[error("command not supported by device (SDK error {0})")]
    Unsupported(i32),

    #[error("invalid channel {0} for device")]
    BadChannel(u8),

    #[error("stale or unknown SDK handle")]
    InvalidHandle,

    #[error("SDK not initialized")]
    NotInitialized,

    #[error("SDK call failed with error code {0}")]
    Raw(i32),
}

impl SdkError {
    /// Classify a raw `NET_DVR_GetLastError` code
    pub fn from_code(code: i32) -> Self {
        match code {
            error_code::PASSWORD_ERROR => SdkError::BadCredentials(code),
            error_code::NOT_INITIALIZED => SdkError::NotInitialized,
            error_code::CHANNEL_ERROR => SdkError::BadChannel(0),
            error_code::CONNECT_FAILED => SdkError::ConnectFailed(code),
            error_code::RECV_TIMEOUT => SdkError::Timeout(code),
            error_code::NOT_SUPPORTED => SdkError::Unsupported(code),
            other => SdkError::Raw(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_classification() {
        assert_eq!(
            SdkError::from_code(error_code::PASSWORD_ERROR),
            SdkError::BadCredentials(1)
        );
        assert_eq!(
            SdkError::from_code(error_code::CONNECT_FAILED),
            SdkError::ConnectFailed(7)
        );
        assert_eq!(
            SdkError::from_code(error_code::RECV_TIMEOUT),
            SdkError::Timeout(10)
        );
        assert_eq!(
            SdkError::from_code(error_code::NOT_SUPPORTED),
            SdkError::Unsupported(23)
        );
    }

    #[test]
    fn test_unknown_code_stays_raw() {
        assert_eq!(SdkError::from_code(9999), SdkError::Raw(9999));
    }
}
