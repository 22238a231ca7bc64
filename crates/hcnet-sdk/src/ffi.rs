//! FFI declarations for the HCNetSDK shared library
//!
//! Structure layouts follow the HCNetSDK headers for the calls this bridge
//! uses (login, real-play preview, JPEG capture, PTZ). Vendor fields the
//! bridge never reads are folded into reserved padding of the documented
//! size, so the structs stay ABI-compatible without dragging in the whole
//! header surface.

#![allow(dead_code)]

use libc::{c_char, c_void};

/// PTZ command codes for `NET_DVR_PTZControlWithSpeed_Other`
pub mod ptz_cmd {
    pub const ZOOM_IN: u32 = 11;
    pub const ZOOM_OUT: u32 = 12;
    pub const TILT_UP: u32 = 21;
    pub const TILT_DOWN: u32 = 22;
    pub const PAN_LEFT: u32 = 23;
    pub const PAN_RIGHT: u32 = 24;
    /// Preset command code for `NET_DVR_PTZPreset_Other`
    pub const GOTO_PRESET: u32 = 39;
}

/// `dwStop` values for PTZ control calls
pub mod ptz_action {
    pub const START: u32 = 0;
    pub const STOP: u32 = 1;
}

/// Login parameters (`NET_DVR_USER_LOGIN_INFO`)
#[repr(C)]
pub struct NetDvrUserLoginInfo {
    pub device_address: [c_char; 129],
    pub use_transmit: u8,
    pub port: u16,
    pub username: [c_char; 64],
    pub password: [c_char; 64],
    pub login_result_callback: *mut c_void,
    pub user_data: *mut c_void,
    pub async_login: u32,
    pub reserved: [u8; 128],
}

impl Default for NetDvrUserLoginInfo {
    fn default() -> Self {
        Self {
            device_address: [0; 129],
            use_transmit: 0,
            port: 0,
            username: [0; 64],
            password: [0; 64],
            login_result_callback: std::ptr::null_mut(),
            user_data: std::ptr::null_mut(),
            async_login: 0,
            reserved: [0; 128],
        }
    }
}

/// Device description returned by login (`NET_DVR_DEVICEINFO_V40`, reduced to
/// the V30 fields the bridge consumes)
#[repr(C)]
pub struct NetDvrDeviceInfoV40 {
    pub serial_number: [u8; 48],
    pub alarm_in_port_count: u8,
    pub alarm_out_port_count: u8,
    pub disk_count: u8,
    pub device_type: u8,
    pub channel_count: u8,
    pub start_channel: u8,
    pub reserved: [u8; 202],
}

impl Default for NetDvrDeviceInfoV40 {
    fn default() -> Self {
        Self {
            serial_number: [0; 48],
            alarm_in_port_count: 0,
            alarm_out_port_count: 0,
            disk_count: 0,
            device_type: 0,
            channel_count: 0,
            start_channel: 1,
            reserved: [0; 202],
        }
    }
}

/// Real-play parameters (`NET_DVR_PREVIEWINFO`)
#[repr(C)]
pub struct NetDvrPreviewInfo {
    pub channel: i32,
    /// 0 = main stream, 1 = sub stream
    pub stream_type: u32,
    /// 0 = TCP
    pub link_mode: u32,
    /// 0 = no render window, data via callback only
    pub play_window: usize,
    /// 1 = block until the stream is established
    pub blocked: u32,
    pub reserved: [u8; 216],
}

impl Default for NetDvrPreviewInfo {
    fn default() -> Self {
        Self {
            channel: 1,
            stream_type: 0,
            link_mode: 0,
            play_window: 0,
            blocked: 1,
            reserved: [0; 216],
        }
    }
}

/// JPEG capture parameters (`NET_DVR_JPEGPARA`)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NetDvrJpegPara {
    /// 0xFF = capture at the current stream resolution
    pub picture_size: u16,
    /// 0 = best, 1 = better, 2 = average
    pub picture_quality: u16,
}

impl Default for NetDvrJpegPara {
    fn default() -> Self {
        Self {
            picture_size: 0xFF,
            picture_quality: 0,
        }
    }
}

/// Real-play data callback signature (`REALDATACALLBACK`)
pub type RealDataCallback = Option<
    unsafe extern "C" fn(
        play_handle: i64,
        data_type: u32,
        buffer: *mut u8,
        buffer_size: u32,
        user: *mut c_void,
    ),
>;

#[cfg(feature = "vendor-sdk")]
#[link(name = "hcnetsdk")]
extern "C" {
    pub fn NET_DVR_Init() -> i32;
    pub fn NET_DVR_Cleanup() -> i32;
    pub fn NET_DVR_GetLastError() -> u32;

    pub fn NET_DVR_Login_V40(
        login_info: *const NetDvrUserLoginInfo,
        device_info: *mut NetDvrDeviceInfoV40,
    ) -> i64;
    pub fn NET_DVR_Logout(user_id: i64) -> i32;

    pub fn NET_DVR_RealPlay_V40(
        user_id: i64,
        preview_info: *const NetDvrPreviewInfo,
        callback: RealDataCallback,
        user: *mut c_void,
    ) -> i64;
    pub fn NET_DVR_StopRealPlay(play_handle: i64) -> i32;

    pub fn NET_DVR_CaptureJPEGPicture_NEW(
        user_id: i64,
        channel: i64,
        jpeg_para: *const NetDvrJpegPara,
        buffer: *mut c_char,
        buffer_size: u32,
        size_returned: *mut u32,
    ) -> i32;

    pub fn NET_DVR_PTZControlWithSpeed_Other(
        user_id: i64,
        channel: i64,
        ptz_command: u32,
        stop: u32,
        speed: u32,
    ) -> i32;

    pub fn NET_DVR_PTZPreset_Other(
        user_id: i64,
        channel: i64,
        preset_command: u32,
        preset_index: u32,
    ) -> i32;
}

/// Copy a Rust string into a fixed-size NUL-padded C field. The last byte is
/// reserved for the terminator, so over-long values are truncated rather
/// than leaving the vendor library an unterminated buffer.
pub fn fill_c_field(field: &mut [c_char], value: &str) {
    field.fill(0);
    let capacity = field.len().saturating_sub(1);
    for (dst, src) in field.iter_mut().zip(value.bytes().take(capacity)) {
        *dst = src as c_char;
    }
}
