//! SDK backend trait and the native FFI implementation

use crate::SdkError;

/// SDK-assigned login handle for one authenticated camera connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoginToken(pub i64);

/// SDK-assigned handle for one live preview stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(pub i64);

/// Which encoded stream to pull from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamType {
    /// Full-resolution main stream
    #[default]
    Main,
    /// Low-bitrate sub stream
    Sub,
}

impl StreamType {
    /// Value for `NET_DVR_PREVIEWINFO.dwStreamType`
    pub fn as_raw(self) -> u32 {
        match self {
            StreamType::Main => 0,
            StreamType::Sub => 1,
        }
    }
}

/// Start or stop a continuous PTZ motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtzAction {
    Start,
    Stop,
}

impl PtzAction {
    /// Value for the `dwStop` argument of PTZ control calls
    pub fn as_raw(self) -> u32 {
        match self {
            PtzAction::Start => crate::ffi::ptz_action::START,
            PtzAction::Stop => crate::ffi::ptz_action::STOP,
        }
    }
}

/// Device description captured at login time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device serial number
    pub serial_number: String,
    /// Number of analog/IP channels the device exposes
    pub channel_count: u8,
    /// First valid channel number
    pub start_channel: u8,
}

/// The vendor SDK call surface the rest of the workspace programs against.
///
/// All methods are synchronous because every one of them is a blocking
/// network round trip inside the vendor library; callers are expected to
/// offload them with `spawn_blocking`.
pub trait CameraSdk: Send + Sync {
    /// Global SDK initialization. Must precede any other call.
    fn init(&self) -> Result<(), SdkError>;

    /// Global SDK teardown. Invalidates every outstanding handle.
    fn cleanup(&self);

    /// Authenticate against one device and obtain a login token
    fn login(
        &self,
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> Result<(LoginToken, DeviceInfo), SdkError>;

    /// Release a login token. The SDK also tears down any preview still
    /// attached to the token.
    fn logout(&self, token: LoginToken) -> Result<(), SdkError>;

    /// Open a real-time preview stream on a channel
    fn start_preview(
        &self,
        token: LoginToken,
        channel: u8,
        stream: StreamType,
    ) -> Result<PreviewHandle, SdkError>;

    /// Close a preview stream
    fn stop_preview(&self, handle: PreviewHandle) -> Result<(), SdkError>;

    /// Capture a single JPEG still from a channel
    fn capture_jpeg(&self, token: LoginToken, channel: u8) -> Result<Vec<u8>, SdkError>;

    /// Issue one PTZ motion command
    fn ptz_control(
        &self,
        token: LoginToken,
        channel: u8,
        command: u32,
        action: PtzAction,
        speed: u32,
    ) -> Result<(), SdkError>;

    /// Drive the camera to a stored preset position
    fn ptz_preset(&self, token: LoginToken, channel: u8, preset: u8) -> Result<(), SdkError>;
}

/// FFI-backed implementation linking against libhcnetsdk
#[cfg(feature = "vendor-sdk")]
pub struct NativeSdk;

#[cfg(feature = "vendor-sdk")]
mod native {
    use super::*;
    use crate::ffi;
    use libc::c_char;
    use tracing::debug;

    /// Upper bound for a single JPEG still; matches the SDK sample buffers
    const JPEG_BUFFER_SIZE: usize = 2 * 1024 * 1024;

    impl NativeSdk {
        pub fn new() -> Self {
            Self
        }

        fn last_error() -> SdkError {
            let code = unsafe { ffi::NET_DVR_GetLastError() } as i32;
            SdkError::from_code(code)
        }
    }

    impl Default for NativeSdk {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CameraSdk for NativeSdk {
        fn init(&self) -> Result<(), SdkError> {
            if unsafe { ffi::NET_DVR_Init() } == 0 {
                return Err(Self::last_error());
            }
            debug!("HCNetSDK initialized");
            Ok(())
        }

        fn cleanup(&self) {
            unsafe { ffi::NET_DVR_Cleanup() };
        }

        fn login(
            &self,
            host: &str,
            port: u16,
            username: &str,
            password: &str,
        ) -> Result<(LoginToken, DeviceInfo), SdkError> {
            let mut login_info = ffi::NetDvrUserLoginInfo::default();
            ffi::fill_c_field(&mut login_info.device_address, host);
            ffi::fill_c_field(&mut login_info.username, username);
            ffi::fill_c_field(&mut login_info.password, password);
            login_info.port = port;

            let mut device_info = ffi::NetDvrDeviceInfoV40::default();
            let user_id =
                unsafe { ffi::NET_DVR_Login_V40(&login_info, &mut device_info) };
            if user_id < 0 {
                return Err(Self::last_error());
            }

            let serial_len = device_info
                .serial_number
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(device_info.serial_number.len());
            let serial_number =
                String::from_utf8_lossy(&device_info.serial_number[..serial_len]).into_owned();

            debug!(user_id, serial = %serial_number, "SDK login succeeded");
            Ok((
                LoginToken(user_id),
                DeviceInfo {
                    serial_number,
                    channel_count: device_info.channel_count,
                    start_channel: device_info.start_channel,
                },
            ))
        }

        fn logout(&self, token: LoginToken) -> Result<(), SdkError> {
            if unsafe { ffi::NET_DVR_Logout(token.0) } == 0 {
                return Err(Self::last_error());
            }
            Ok(())
        }

        fn start_preview(
            &self,
            token: LoginToken,
            channel: u8,
            stream: StreamType,
        ) -> Result<PreviewHandle, SdkError> {
            let preview_info = ffi::NetDvrPreviewInfo {
                channel: channel as i32,
                stream_type: stream.as_raw(),
                ..Default::default()
            };

            let handle = unsafe {
                ffi::NET_DVR_RealPlay_V40(token.0, &preview_info, None, std::ptr::null_mut())
            };
            if handle < 0 {
                return Err(Self::last_error());
            }
            Ok(PreviewHandle(handle))
        }

        fn stop_preview(&self, handle: PreviewHandle) -> Result<(), SdkError> {
            if unsafe { ffi::NET_DVR_StopRealPlay(handle.0) } == 0 {
                return Err(Self::last_error());
            }
            Ok(())
        }

        fn capture_jpeg(&self, token: LoginToken, channel: u8) -> Result<Vec<u8>, SdkError> {
            let jpeg_para = ffi::NetDvrJpegPara::default();
            let mut buffer = vec![0u8; JPEG_BUFFER_SIZE];
            let mut size_returned: u32 = 0;

            let ok = unsafe {
                ffi::NET_DVR_CaptureJPEGPicture_NEW(
                    token.0,
                    channel as i64,
                    &jpeg_para,
                    buffer.as_mut_ptr() as *mut c_char,
                    buffer.len() as u32,
                    &mut size_returned,
                )
            };
            if ok == 0 {
                return Err(Self::last_error());
            }

            buffer.truncate(size_returned as usize);
            Ok(buffer)
        }

        fn ptz_control(
            &self,
            token: LoginToken,
            channel: u8,
            command: u32,
            action: PtzAction,
            speed: u32,
        ) -> Result<(), SdkError> {
            let ok = unsafe {
                ffi::NET_DVR_PTZControlWithSpeed_Other(
                    token.0,
                    channel as i64,
                    command,
                    action.as_raw(),
                    speed,
                )
            };
            if ok == 0 {
                return Err(Self::last_error());
            }
            Ok(())
        }

        fn ptz_preset(&self, token: LoginToken, channel: u8, preset: u8) -> Result<(), SdkError> {
            let ok = unsafe {
                ffi::NET_DVR_PTZPreset_Other(
                    token.0,
                    channel as i64,
                    ffi::ptz_cmd::GOTO_PRESET,
                    preset as u32,
                )
            };
            if ok == 0 {
                return Err(Self::last_error());
            }
            Ok(())
        }
    }
}
