use std::time::Duration;

use log::*;
use ros_common::Secret;

const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base url of the payment gateway API, e.g. "https://api.gateway.example".
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Shared secret used to verify webhook signatures.
    pub webhook_secret: Secret<String>,
    /// Upper bound on any single gateway call. Expiry surfaces as a retryable error.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.gateway.example".to_string(),
            api_key: Secret::default(),
            webhook_secret: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("ROS_GATEWAY_URL").unwrap_or_else(|_| {
            warn!("🪛️ ROS_GATEWAY_URL not set, using a placeholder. Intent creation will fail.");
            "https://api.gateway.example".to_string()
        });
        let api_key = Secret::new(std::env::var("ROS_GATEWAY_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ ROS_GATEWAY_API_KEY not set. Gateway calls will be rejected.");
            String::default()
        }));
        let webhook_secret = Secret::new(std::env::var("ROS_GATEWAY_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ ROS_GATEWAY_WEBHOOK_SECRET not set. Webhook signatures will not validate.");
            String::default()
        }));
        let timeout = std::env::var("ROS_GATEWAY_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for ROS_GATEWAY_TIMEOUT: {s}. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS));
        Self { api_url, api_key, webhook_secret, timeout }
    }
}
