use std::env;

use gateway_tools::GatewayConfig;
use log::*;

const DEFAULT_ROS_HOST: &str = "127.0.0.1";
const DEFAULT_ROS_PORT: u16 = 8440;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Everything needed to talk to (and be talked to by) the payment gateway.
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ROS_HOST.to_string(),
            port: DEFAULT_ROS_PORT,
            database_url: String::default(),
            database_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ROS_HOST").ok().unwrap_or_else(|| DEFAULT_ROS_HOST.into());
        let port = env::var("ROS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for ROS_PORT. {e} Using the default, {DEFAULT_ROS_PORT}, instead."
                    );
                    DEFAULT_ROS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_ROS_PORT);
        let database_url = env::var("ROS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ ROS_DATABASE_URL is not set. Please set it to the URL for the order store.");
            String::default()
        });
        let database_max_connections = env::var("ROS_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid value for ROS_DB_MAX_CONNECTIONS: {s}. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let gateway = GatewayConfig::new_from_env_or_default();
        Self { host, port, database_url, database_max_connections, gateway }
    }
}
