use log::*;
use mps_common::Secret;

const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base url of the gateway REST API, e.g. "https://api.gateway.example.com"
    pub base_url: String,
    /// The API secret key, sent as a bearer token on every request.
    pub secret_key: Secret,
    /// Shared secret used to verify webhook signatures. Not used by the client itself, but it lives with the rest of
    /// the gateway credentials.
    pub webhook_secret: Secret,
    /// Hard cap on every gateway call. Checkout and mirror-sync paths treat a timeout as a retryable gateway error.
    pub timeout_secs: u64,
    /// Where the gateway redirects the shopper after a successful payment. May contain the `{CHECKOUT_SESSION_ID}`
    /// placeholder, which the gateway substitutes.
    pub success_url: String,
    /// Where the gateway redirects the shopper after a cancelled payment.
    pub cancel_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gateway.invalid".to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            success_url: "http://localhost:3000/payment?status=success&session_id={CHECKOUT_SESSION_ID}".to_string(),
            cancel_url: "http://localhost:3000/payment?status=cancel".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = GatewayConfig::default();
        let base_url = std::env::var("MPS_GATEWAY_URL").unwrap_or_else(|_| {
            warn!("MPS_GATEWAY_URL not set, using a non-routable default");
            defaults.base_url.clone()
        });
        let secret_key = Secret::from_env("MPS_GATEWAY_SECRET_KEY").unwrap_or_else(|| {
            warn!("MPS_GATEWAY_SECRET_KEY not set. Gateway calls will be rejected.");
            Secret::default()
        });
        let webhook_secret = Secret::from_env("MPS_GATEWAY_WEBHOOK_SECRET").unwrap_or_else(|| {
            warn!("MPS_GATEWAY_WEBHOOK_SECRET not set. Incoming webhooks cannot be verified.");
            Secret::default()
        });
        let timeout_secs = std::env::var("MPS_GATEWAY_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS);
        let success_url = std::env::var("MPS_SUCCESS_URL").unwrap_or_else(|_| {
            warn!("MPS_SUCCESS_URL not set, shoppers will be redirected to localhost after payment");
            defaults.success_url.clone()
        });
        let cancel_url = std::env::var("MPS_CANCEL_URL").unwrap_or_else(|_| {
            warn!("MPS_CANCEL_URL not set, shoppers will be redirected to localhost after cancelling");
            defaults.cancel_url.clone()
        });
        Self { base_url, secret_key, webhook_secret, timeout_secs, success_url, cancel_url }
    }
}
