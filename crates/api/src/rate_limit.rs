//! Rate Limiting for the Chat Endpoint
//!
//! Per-peer-IP limits using tower_governor (GCRA, no background tasks).
//! Every chat request costs a language-model call, so only that route is
//! limited.

use crate::ApiError;
use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config with X-RateLimit-* headers enabled
pub type ChatGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests that can be made back to back
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 2,
            burst_size: 5,
        }
    }
}

/// Build the governor config, or `None` when limiting is switched off.
///
/// The server must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()` for the peer IP
/// to be available.
pub fn create_governor_config(
    config: &RateLimitConfig,
) -> Result<Option<Arc<ChatGovernorConfig>>, ApiError> {
    if !config.enabled {
        return Ok(None);
    }

    let governor = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| {
            ApiError::Config("rate limit per_second and burst_size must be positive".to_string())
        })?;
    Ok(Some(Arc::new(governor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.per_second, 2);
        assert_eq!(config.burst_size, 5);
        assert!(create_governor_config(&config).unwrap().is_some());
    }

    #[test]
    fn test_disabled() {
        let config = RateLimitConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(create_governor_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_zero_burst_rejected() {
        let config = RateLimitConfig {
            burst_size: 0,
            ..Default::default()
        };
        assert!(matches!(create_governor_config(&config), Err(ApiError::Config(_))));
    }
}
