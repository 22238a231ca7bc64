//! Enviz camera bridge entry point

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use camera_session::BackoffPolicy;
use api::{build_sdk, init_logging, run_server, AppState, BridgeSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = BridgeSettings::load().context("failed to load bridge settings")?;
    info!(
        listen = %settings.listen,
        cameras = settings.cameras.len(),
        "enviz camera bridge starting"
    );

    let sdk = build_sdk();
    let state = Arc::new(
        AppState::new(settings.cameras, sdk)
            .context("failed to build camera registry")?
            .with_ptz_throttle(settings.ptz_throttle),
    );

    // Bring configured cameras up in the background; the API serves
    // regardless, reporting each camera unavailable until its login lands.
    for handle in state.registry.iter() {
        let handle = Arc::clone(handle);
        tokio::spawn(async move {
            let policy = BackoffPolicy::default();
            match handle.session().connect_with_backoff(&policy).await {
                Ok(device) => {
                    info!(
                        camera = handle.id(),
                        serial = %device.serial_number,
                        "camera connected"
                    );
                }
                Err(err) => {
                    error!(camera = handle.id(), error = %err, "camera failed to connect");
                }
            }
        });
    }

    run_server(&settings.listen, state).await
}
