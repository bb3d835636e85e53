//! Server configuration.
//!
//! Everything is read from environment variables with an `MPS_` prefix. Missing values fall back to defaults that are
//! usable for local development, with a warning, so a bare `cargo run` comes up.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `MPS_HOST` | Interface to bind | `127.0.0.1` |
//! | `MPS_PORT` | Port to bind | `4433` |
//! | `MPS_DATABASE_URL` | SQLite database URL | `sqlite://data/market_store.db` |
//! | `MPS_GATEWAY_SIGNATURE_CHECKS` | Verify webhook signatures | `1` |
//! | `MPS_GATEWAY_*` | Gateway REST credentials and URLs | see [`gateway_tools::GatewayConfig`] |
use std::env;

use gateway_tools::GatewayConfig;
use log::*;

const DEFAULT_MPS_HOST: &str = "127.0.0.1";
const DEFAULT_MPS_PORT: u16 = 4433;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Credentials and endpoints for the payment gateway REST API.
    pub gateway: GatewayConfig,
    /// When false, webhook signature verification is skipped. Local development only. **DANGER**
    pub signature_checks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPS_HOST.to_string(),
            port: DEFAULT_MPS_PORT,
            database_url: String::default(),
            gateway: GatewayConfig::default(),
            signature_checks: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MPS_HOST").ok().unwrap_or_else(|| DEFAULT_MPS_HOST.into());
        let port = env::var("MPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("{s} is not a valid port for MPS_PORT. {e} Using the default, {DEFAULT_MPS_PORT}, instead.");
                    DEFAULT_MPS_PORT
                })
            })
            .unwrap_or(DEFAULT_MPS_PORT);
        let database_url = env::var("MPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("MPS_DATABASE_URL is not set. Using the default sqlite database.");
            "sqlite://data/market_store.db".into()
        });
        let signature_checks =
            env::var("MPS_GATEWAY_SIGNATURE_CHECKS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        if !signature_checks {
            warn!(
                "🚨️ Webhook signature checks are DISABLED. Anyone can fabricate payment events. Do not run like \
                 this in production."
            );
        }
        let gateway = GatewayConfig::new_from_env_or_default();
        Self { host, port, database_url, gateway, signature_checks }
    }
}
