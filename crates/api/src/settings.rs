//! Bridge configuration loading
//!
//! Layered the usual way: optional `enviz-bridge` config file in the working
//! directory, then `ENVIZ_`-prefixed environment variables on top.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::rate_limit::PtzThrottle;
use crate::registry::CameraEntry;

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

/// Top-level bridge settings
#[derive(Debug, Deserialize)]
pub struct BridgeSettings {
    /// Address the HTTP server binds
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Cameras to register at startup
    #[serde(default)]
    pub cameras: Vec<CameraEntry>,
    /// Throttle applied to PTZ service calls
    #[serde(default)]
    pub ptz_throttle: PtzThrottle,
}

impl BridgeSettings {
    /// Load from `enviz-bridge.{toml,json,yaml}` plus `ENVIZ_*` overrides
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("enviz-bridge").required(false))
            .add_source(Environment::with_prefix("ENVIZ").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_settings_parse_with_camera_defaults() {
        let raw = r#"
            listen = "127.0.0.1:9000"

            [[cameras]]
            id = "front-door"
            host = "10.0.0.5"
            password = "x"
        "#;

        let settings: BridgeSettings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.listen, "127.0.0.1:9000");
        assert_eq!(settings.cameras.len(), 1);
        let camera = &settings.cameras[0].camera;
        assert_eq!(camera.port, 8000);
        assert_eq!(camera.username, "admin");
        assert_eq!(camera.channel, 1);
    }

    #[test]
    fn test_settings_default_listen_and_empty_cameras() {
        let settings: BridgeSettings = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.listen, "0.0.0.0:8080");
        assert!(settings.cameras.is_empty());
        assert_eq!(settings.ptz_throttle.burst, 5);
    }

    #[test]
    fn test_ptz_throttle_override_from_file() {
        let raw = r#"
            [ptz_throttle]
            replenish_secs = 2
            burst = 3
        "#;

        let settings: BridgeSettings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.ptz_throttle.replenish_secs, 2);
        assert_eq!(settings.ptz_throttle.burst, 3);
    }
}
