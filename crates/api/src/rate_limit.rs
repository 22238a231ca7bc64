//! Request throttling for PTZ routes
//!
//! Every PTZ call moves hardware. A client looping move commands can wear
//! the gimbal and starve the camera's command queue, so the PTZ routes sit
//! behind a per-client GCRA throttle keyed by peer IP.

use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

pub type PtzGovernor = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

fn default_replenish_secs() -> u64 {
    1
}

fn default_burst() -> u32 {
    5
}

/// Throttle parameters for PTZ service calls. Overridable per deployment
/// from the bridge settings file; the defaults allow interactive nudging
/// but not a runaway loop.
#[derive(Debug, Clone, Deserialize)]
pub struct PtzThrottle {
    /// Seconds to replenish one call
    #[serde(default = "default_replenish_secs")]
    pub replenish_secs: u64,
    /// Calls allowed to burst before throttling kicks in
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for PtzThrottle {
    fn default() -> Self {
        Self {
            replenish_secs: default_replenish_secs(),
            burst: default_burst(),
        }
    }
}

impl PtzThrottle {
    /// Governor for `GovernorLayer`, with X-RateLimit-* response headers.
    /// The peer IP key extractor requires the service to be started with
    /// `into_make_service_with_connect_info::<SocketAddr>()`.
    pub fn governor(&self) -> Arc<PtzGovernor> {
        Arc::new(
            GovernorConfigBuilder::default()
                .per_second(self.replenish_secs.max(1))
                .burst_size(self.burst.max(1))
                .use_headers()
                .finish()
                .expect("throttle parameters are non-zero"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let throttle: PtzThrottle = serde_json::from_str("{}").unwrap();
        assert_eq!(throttle.replenish_secs, 1);
        assert_eq!(throttle.burst, 5);

        let throttle: PtzThrottle = serde_json::from_str(r#"{"burst": 2}"#).unwrap();
        assert_eq!(throttle.burst, 2);
        assert_eq!(throttle.replenish_secs, 1);
    }

    #[test]
    fn test_zero_parameters_are_clamped() {
        let throttle = PtzThrottle {
            replenish_secs: 0,
            burst: 0,
        };
        // Builds without panicking despite zeroed input
        let _governor = throttle.governor();
    }
}
