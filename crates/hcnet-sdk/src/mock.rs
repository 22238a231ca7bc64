//! In-process mock SDK backend
//!
//! Mirrors the observable behavior of the native library closely enough for
//! the rest of the workspace to be tested without a camera: login tokens,
//! per-token preview bookkeeping (logout releases the token's previews, as
//! the real SDK does), error codes and single-shot fault injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::debug;

use crate::backend::{CameraSdk, DeviceInfo, LoginToken, PreviewHandle, PtzAction, StreamType};
use crate::{error_code, SdkError};

/// Minimal JPEG (SOI + JFIF APP0 + EOI) returned by `capture_jpeg`
pub const MOCK_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

#[derive(Debug, Default)]
struct MockState {
    initialized: bool,
    reachable: bool,
    ptz_supported: bool,
    username: String,
    password: String,
    channel_count: u8,
    snapshot: Vec<u8>,
    next_token: i64,
    next_preview: i64,
    /// login token -> previews opened on it
    tokens: HashMap<i64, HashSet<i64>>,
    /// preview handle -> owning token
    previews: HashMap<i64, i64>,
    /// consumed by the next SDK call that can fail
    pending_fault: Option<SdkError>,
    /// last PTZ invocation, for assertions: (command, stop, speed)
    last_ptz: Option<(u32, u32, u32)>,
}

/// Mock camera SDK for tests and hardware-free development
pub struct MockSdk {
    inner: Mutex<MockState>,
}

impl MockSdk {
    /// Mock device accepting `admin` / `admin` on any host
    pub fn new() -> Self {
        Self::with_credentials("admin", "admin")
    }

    /// Mock device accepting only the given credentials
    pub fn with_credentials(username: &str, password: &str) -> Self {
        Self {
            inner: Mutex::new(MockState {
                reachable: true,
                ptz_supported: true,
                username: username.to_string(),
                password: password.to_string(),
                channel_count: 1,
                snapshot: MOCK_JPEG.to_vec(),
                next_token: 0,
                next_preview: 100,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // Mutex poisoning only happens if a test panicked mid-call
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Simulate the device going off the network
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Simulate a fixed-lens model without PTZ support
    pub fn set_ptz_supported(&self, supported: bool) {
        self.lock().ptz_supported = supported;
    }

    /// Replace the JPEG bytes returned by `capture_jpeg`
    pub fn set_snapshot(&self, bytes: Vec<u8>) {
        self.lock().snapshot = bytes;
    }

    /// Fail the next fallible SDK call with the given error
    pub fn inject_fault(&self, fault: SdkError) {
        self.lock().pending_fault = Some(fault);
    }

    /// Number of login tokens that have not been logged out
    pub fn live_token_count(&self) -> usize {
        self.lock().tokens.len()
    }

    /// Number of preview streams that have not been stopped
    pub fn open_preview_count(&self) -> usize {
        self.lock().previews.len()
    }

    /// Last PTZ call as (command, stop, speed), if any
    pub fn last_ptz_call(&self) -> Option<(u32, u32, u32)> {
        self.lock().last_ptz
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

fn take_fault(state: &mut MockState) -> Result<(), SdkError> {
    match state.pending_fault.take() {
        Some(fault) => Err(fault),
        None => Ok(()),
    }
}

impl CameraSdk for MockSdk {
    fn init(&self) -> Result<(), SdkError> {
        self.lock().initialized = true;
        Ok(())
    }

    fn cleanup(&self) {
        let mut state = self.lock();
        state.initialized = false;
        state.tokens.clear();
        state.previews.clear();
    }

    fn login(
        &self,
        host: &str,
        _port: u16,
        username: &str,
        password: &str,
    ) -> Result<(LoginToken, DeviceInfo), SdkError> {
        let mut state = self.lock();
        if !state.initialized {
            return Err(SdkError::NotInitialized);
        }
        take_fault(&mut state)?;
        if !state.reachable {
            return Err(SdkError::ConnectFailed(error_code::CONNECT_FAILED));
        }
        if username != state.username || password != state.password {
            return Err(SdkError::BadCredentials(error_code::PASSWORD_ERROR));
        }

        let token = state.next_token;
        state.next_token += 1;
        state.tokens.insert(token, HashSet::new());
        debug!(host, token, "mock SDK login");

        let channel_count = state.channel_count;
        Ok((
            LoginToken(token),
            DeviceInfo {
                serial_number: format!("MOCK-{host}"),
                channel_count,
                start_channel: 1,
            },
        ))
    }

    fn logout(&self, token: LoginToken) -> Result<(), SdkError> {
        let mut state = self.lock();
        let previews = state
            .tokens
            .remove(&token.0)
            .ok_or(SdkError::InvalidHandle)?;
        // The native SDK frees previews still attached to the login
        for preview in previews {
            state.previews.remove(&preview);
        }
        debug!(token = token.0, "mock SDK logout");
        Ok(())
    }

    fn start_preview(
        &self,
        token: LoginToken,
        channel: u8,
        _stream: StreamType,
    ) -> Result<PreviewHandle, SdkError> {
        let mut state = self.lock();
        take_fault(&mut state)?;
        if !state.tokens.contains_key(&token.0) {
            return Err(SdkError::InvalidHandle);
        }
        if channel == 0 || channel > state.channel_count {
            return Err(SdkError::BadChannel(channel));
        }
        if !state.reachable {
            return Err(SdkError::ConnectFailed(error_code::CONNECT_FAILED));
        }

        let preview = state.next_preview;
        state.next_preview += 1;
        state.previews.insert(preview, token.0);
        if let Some(previews) = state.tokens.get_mut(&token.0) {
            previews.insert(preview);
        }
        Ok(PreviewHandle(preview))
    }

    fn stop_preview(&self, handle: PreviewHandle) -> Result<(), SdkError> {
        let mut state = self.lock();
        let token = state
            .previews
            .remove(&handle.0)
            .ok_or(SdkError::InvalidHandle)?;
        if let Some(previews) = state.tokens.get_mut(&token) {
            previews.remove(&handle.0);
        }
        Ok(())
    }

    fn capture_jpeg(&self, token: LoginToken, channel: u8) -> Result<Vec<u8>, SdkError> {
        let mut state = self.lock();
        take_fault(&mut state)?;
        if !state.tokens.contains_key(&token.0) {
            return Err(SdkError::InvalidHandle);
        }
        if channel == 0 || channel > state.channel_count {
            return Err(SdkError::BadChannel(channel));
        }
        if !state.reachable {
            return Err(SdkError::Timeout(error_code::RECV_TIMEOUT));
        }
        Ok(state.snapshot.clone())
    }

    fn ptz_control(
        &self,
        token: LoginToken,
        channel: u8,
        command: u32,
        action: PtzAction,
        speed: u32,
    ) -> Result<(), SdkError> {
        let mut state = self.lock();
        take_fault(&mut state)?;
        if !state.tokens.contains_key(&token.0) {
            return Err(SdkError::InvalidHandle);
        }
        if channel == 0 || channel > state.channel_count {
            return Err(SdkError::BadChannel(channel));
        }
        if !state.ptz_supported {
            return Err(SdkError::Unsupported(error_code::NOT_SUPPORTED));
        }
        state.last_ptz = Some((command, action.as_raw(), speed));
        Ok(())
    }

    fn ptz_preset(&self, token: LoginToken, channel: u8, preset: u8) -> Result<(), SdkError> {
        let mut state = self.lock();
        take_fault(&mut state)?;
        if !state.tokens.contains_key(&token.0) {
            return Err(SdkError::InvalidHandle);
        }
        if channel == 0 || channel > state.channel_count {
            return Err(SdkError::BadChannel(channel));
        }
        if !state.ptz_supported {
            return Err(SdkError::Unsupported(error_code::NOT_SUPPORTED));
        }
        state.last_ptz = Some((crate::ffi::ptz_cmd::GOTO_PRESET, 0, preset as u32));
        Ok(())
    }
}
