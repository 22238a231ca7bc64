//! Session state machine and connect/reconnect logic

use std::sync::Arc;
use std::time::Duration;

use hcnet_sdk::{CameraSdk, DeviceInfo, LoginToken};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{CameraConfig, CameraError};

/// Connection state of one camera session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No login held; initial state and the state after `disconnect`
    Disconnected,
    /// A connect attempt is in flight
    Connecting,
    /// Login token is live and usable
    Connected,
    /// The session was connected and then lost; operations fail until an
    /// explicit reconnect
    Failed,
}

impl SessionState {
    /// Host-platform availability: only a connected session is available
    pub fn is_available(self) -> bool {
        self == SessionState::Connected
    }
}

/// Bounded exponential backoff for reconnect attempts.
///
/// The original integration reconnects only on explicit caller action; the
/// backoff loop here is the documented improvement over that behavior. Auth
/// failures abort immediately since retrying bad credentials can lock the
/// account.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Total connect attempts before giving up
    pub max_attempts: u32,
    /// Delay after the first failure
    pub initial_delay: Duration,
    /// Cap applied to the doubled delay
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    token: Option<LoginToken>,
    device: Option<DeviceInfo>,
}

/// Owns the login lifecycle for one configured camera.
///
/// Exactly one live SDK login per manager. The inner mutex is held across
/// the blocking login/logout round trips, which serializes connect,
/// reconnect and disconnect; read paths (`token`, `state`) only take the
/// lock briefly.
pub struct SessionManager {
    config: CameraConfig,
    sdk: Arc<dyn CameraSdk>,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// Validate the config and build a manager in `Disconnected` state
    pub fn new(config: CameraConfig, sdk: Arc<dyn CameraSdk>) -> Result<Self, CameraError> {
        config.validate()?;
        Ok(Self {
            config,
            sdk,
            inner: Mutex::new(SessionInner {
                state: SessionState::Disconnected,
                token: None,
                device: None,
            }),
        })
    }

    /// The immutable connection parameters
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Current session state
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Whether the session holds a usable login
    pub async fn is_connected(&self) -> bool {
        self.state().await == SessionState::Connected
    }

    /// Device description captured at login, if connected at least once
    pub async fn device_info(&self) -> Option<DeviceInfo> {
        self.inner.lock().await.device.clone()
    }

    /// Login token for issuing SDK calls. Fails unless the session is in
    /// `Connected` state; a `Failed` session must be reconnected first.
    pub async fn token(&self) -> Result<LoginToken, CameraError> {
        let inner = self.inner.lock().await;
        match (inner.state, inner.token) {
            (SessionState::Connected, Some(token)) => Ok(token),
            _ => Err(CameraError::NotConnected),
        }
    }

    /// Log in to the camera. Idempotent while connected. On failure the
    /// session ends in `Failed` state and the error is classified per the
    /// SDK code (auth / network / timeout).
    pub async fn connect(&self) -> Result<DeviceInfo, CameraError> {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Connected {
            if let Some(device) = inner.device.clone() {
                return Ok(device);
            }
        }

        // A session that failed while holding a login still owns its token.
        // Release it before taking a new one; failures are swallowed since
        // the token is being discarded either way.
        if let Some(stale) = inner.token.take() {
            let sdk = Arc::clone(&self.sdk);
            match tokio::task::spawn_blocking(move || sdk.logout(stale)).await {
                Ok(Ok(())) => debug!(host = %self.config.host, "stale login released"),
                Ok(Err(err)) => {
                    warn!(host = %self.config.host, error = %err, "stale logout failed")
                }
                Err(err) => {
                    warn!(host = %self.config.host, error = %err, "stale logout task failed")
                }
            }
        }

        inner.state = SessionState::Connecting;
        debug!(host = %self.config.host, "connecting to camera");

        let sdk = Arc::clone(&self.sdk);
        let (host, port) = (self.config.host.clone(), self.config.port);
        let (username, password) =
            (self.config.username.clone(), self.config.password.clone());

        let result = match tokio::task::spawn_blocking(move || {
            sdk.init()?;
            sdk.login(&host, port, &username, &password)
        })
        .await
        {
            Ok(result) => result,
            Err(err) => {
                inner.state = SessionState::Failed;
                return Err(CameraError::Worker(err.to_string()));
            }
        };

        match result {
            Ok((token, device)) => {
                inner.state = SessionState::Connected;
                inner.token = Some(token);
                inner.device = Some(device.clone());
                info!(
                    host = %self.config.host,
                    serial = %device.serial_number,
                    channels = device.channel_count,
                    "camera connected"
                );
                Ok(device)
            }
            Err(err) => {
                inner.state = SessionState::Failed;
                inner.token = None;
                let err = CameraError::from(err);
                warn!(host = %self.config.host, error = %err, "camera connect failed");
                Err(err)
            }
        }
    }

    /// Log out and return to `Disconnected`. Idempotent; logout failures are
    /// logged and swallowed since the token is being discarded either way.
    /// The SDK releases previews still attached to the login.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        let token = inner.token.take();
        inner.state = SessionState::Disconnected;
        inner.device = None;

        // Lock stays held so a racing connect cannot log in mid-logout
        if let Some(token) = token {
            let sdk = Arc::clone(&self.sdk);
            let result =
                tokio::task::spawn_blocking(move || sdk.logout(token)).await;
            match result {
                Ok(Ok(())) => info!(host = %self.config.host, "camera disconnected"),
                Ok(Err(err)) => {
                    warn!(host = %self.config.host, error = %err, "logout failed")
                }
                Err(err) => {
                    warn!(host = %self.config.host, error = %err, "logout task failed")
                }
            }
        }
    }

    /// Record network loss observed by a caller: `Connected` becomes
    /// `Failed`, other states are left alone. The stale token is kept so a
    /// later `disconnect` can still attempt a clean logout.
    pub async fn mark_failed(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Connected {
            warn!(host = %self.config.host, "camera session marked failed");
            inner.state = SessionState::Failed;
        }
    }

    /// Connect with bounded exponential backoff. Auth errors abort the loop
    /// immediately; network and timeout errors are retried up to
    /// `policy.max_attempts` with doubling delays capped at
    /// `policy.max_delay`.
    pub async fn connect_with_backoff(
        &self,
        policy: &BackoffPolicy,
    ) -> Result<DeviceInfo, CameraError> {
        let mut delay = policy.initial_delay;
        let mut last_err = CameraError::NotConnected;

        for attempt in 1..=policy.max_attempts.max(1) {
            match self.connect().await {
                Ok(device) => return Ok(device),
                Err(CameraError::Auth) => return Err(CameraError::Auth),
                Err(err) => {
                    warn!(
                        host = %self.config.host,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %err,
                        "connect attempt failed"
                    );
                    last_err = err;
                }
            }

            if attempt < policy.max_attempts {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
        }

        Err(last_err)
    }
}
