//! Camera connection configuration

use serde::{Deserialize, Serialize};

use crate::CameraError;

/// Default SDK port on Hikvision devices
pub const DEFAULT_PORT: u16 = 8000;
/// Factory default account name
pub const DEFAULT_USERNAME: &str = "admin";
/// First device channel
pub const DEFAULT_CHANNEL: u8 = 1;

/// Connection parameters for one camera. Immutable once the session manager
/// is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device hostname or IP address
    pub host: String,
    /// SDK command port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Account name
    #[serde(default = "default_username")]
    pub username: String,
    /// Account password
    pub password: String,
    /// Channel to stream and capture from
    #[serde(default = "default_channel")]
    pub channel: u8,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_channel() -> u8 {
    DEFAULT_CHANNEL
}

impl CameraConfig {
    /// Config with default port, username and channel
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: password.into(),
            channel: DEFAULT_CHANNEL,
        }
    }

    /// Presence checks only; connectivity is validated by connecting
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.host.trim().is_empty() {
            return Err(CameraError::Config("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(CameraError::Config("port must not be zero".into()));
        }
        if self.username.is_empty() {
            return Err(CameraError::Config("username must not be empty".into()));
        }
        if self.password.is_empty() {
            return Err(CameraError::Config("password must not be empty".into()));
        }
        if self.channel == 0 {
            return Err(CameraError::Config("channel numbering starts at 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = CameraConfig::new("10.0.0.5", "x");
        assert_eq!(config.port, 8000);
        assert_eq!(config.username, "admin");
        assert_eq!(config.channel, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = CameraConfig::new("  ", "x");
        assert!(matches!(config.validate(), Err(CameraError::Config(_))));
    }

    #[test]
    fn test_empty_password_rejected() {
        let config = CameraConfig::new("10.0.0.5", "");
        assert!(matches!(config.validate(), Err(CameraError::Config(_))));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: CameraConfig =
            serde_json::from_str(r#"{"host":"10.0.0.5","password":"x"}"#).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.username, "admin");
        assert_eq!(config.channel, 1);
    }
}
