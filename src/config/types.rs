use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub fees: FeeConfig,
}

/// Connection settings for the payment processor REST API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client-credentials pair for the token exchange. Empty values are a
    /// configuration error at gateway construction time, not at capture time.
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_token_cache_secs")]
    pub token_cache_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
            request_timeout_secs: default_timeout(),
            token_cache_secs: default_token_cache_secs(),
        }
    }
}

/// Platform fee and loyalty reward settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeConfig {
    #[serde(default = "default_platform_fee_percent")]
    pub platform_fee_percent: f64,
    #[serde(default = "default_loyalty_percent")]
    pub loyalty_coupon_percent: f64,
    #[serde(default = "default_loyalty_valid_days")]
    pub loyalty_coupon_valid_days: i64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            platform_fee_percent: default_platform_fee_percent(),
            loyalty_coupon_percent: default_loyalty_percent(),
            loyalty_coupon_valid_days: default_loyalty_valid_days(),
        }
    }
}

fn default_base_url() -> String {
    "https://api-m.paypal.com".into()
}

fn default_timeout() -> u64 {
    30
}

fn default_token_cache_secs() -> u64 {
    28800 // 8 hours, the processor's own token lifetime
}

fn default_platform_fee_percent() -> f64 {
    5.0
}

fn default_loyalty_percent() -> f64 {
    10.0
}

fn default_loyalty_valid_days() -> i64 {
    90
}
