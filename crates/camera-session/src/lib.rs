//! Camera Session Management
//!
//! Owns the login lifecycle against a single camera: configuration,
//! connect/disconnect, the session state machine and bounded-backoff
//! reconnect. Everything that talks to a camera goes through a
//! [`SessionManager`]; one manager holds at most one live SDK login.

mod config;
mod error;
mod session;

pub use config::CameraConfig;
pub use error::CameraError;
pub use session::{BackoffPolicy, SessionManager, SessionState};
