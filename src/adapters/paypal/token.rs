use std::time::{Duration, Instant};

use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::config::types::GatewayConfig;
use crate::error::{CheckoutError, Result};

/// Client-credentials token manager for the payment processor.
///
/// Exchanges the configured credential pair for a bearer token and caches it
/// with a TTL. Shared by the capture and payout paths.
#[derive(Debug)]
pub struct AccessTokenManager {
    http: Client,
    base_url: String,
    basic_auth: String,
    cache_ttl: Duration,
    /// Token plus the instant it stops being usable.
    cached_token: RwLock<Option<(String, Instant)>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Margin subtracted from the processor-reported lifetime so a token is
/// never used right at its expiry.
const REFRESH_MARGIN_SECS: u64 = 60;

impl AccessTokenManager {
    /// Fails fast on missing credentials: settlement must never reach the
    /// capture step with a gateway that cannot authenticate.
    pub fn new(http: Client, config: &GatewayConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            return Err(CheckoutError::Config(
                "payment processor client_id/client_secret not configured".into(),
            ));
        }
        Url::parse(&config.base_url)?;
        let basic_auth = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", config.client_id, config.client_secret));
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            basic_auth,
            cache_ttl: Duration::from_secs(config.token_cache_secs),
            cached_token: RwLock::new(None),
        })
    }

    /// Get a bearer token, exchanging credentials if none is cached.
    pub async fn access_token(&self) -> Result<String> {
        {
            let guard = self.cached_token.read().await;
            if let Some((ref token, valid_until)) = *guard
                && Instant::now() < valid_until
            {
                return Ok(token.clone());
            }
        }

        debug!("Exchanging client credentials for a processor access token");

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", self.basic_auth))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(CheckoutError::Http)?;

        let status = response.status();
        if !status.is_success() {
            // 401 here means the credential pair itself is wrong.
            return Err(CheckoutError::Config(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let body: TokenResponse = response.json().await.map_err(CheckoutError::Http)?;

        // A token that would expire within the margin is not cached at all;
        // the next call performs a fresh exchange.
        let lifetime = body.expires_in.saturating_sub(REFRESH_MARGIN_SECS);
        if lifetime > 0 {
            let ttl = self.cache_ttl.min(Duration::from_secs(lifetime));
            let mut guard = self.cached_token.write().await;
            *guard = Some((body.access_token.clone(), Instant::now() + ttl));
        }

        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.to_string(),
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            request_timeout_secs: 5,
            token_cache_secs: 3600,
        }
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let mut cfg = config("https://api.example.com");
        cfg.client_secret = String::new();
        let result = AccessTokenManager::new(Client::new(), &cfg);
        assert!(matches!(result.unwrap_err(), CheckoutError::Config(_)));
    }

    #[test]
    fn malformed_base_url_rejected() {
        let result = AccessTokenManager::new(Client::new(), &config("not a url"));
        assert!(matches!(result.unwrap_err(), CheckoutError::Url(_)));
    }

    #[tokio::test]
    async fn token_cached_after_first_exchange() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/oauth2/token"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "tok-123", "expires_in": 28800}),
            ))
            .expect(1) // Only 1 exchange should happen
            .mount(&mock_server)
            .await;

        let mgr = AccessTokenManager::new(Client::new(), &config(&mock_server.uri())).unwrap();
        let t1 = mgr.access_token().await.unwrap();
        let t2 = mgr.access_token().await.unwrap();
        assert_eq!(t1, "tok-123");
        assert_eq!(t2, "tok-123");
        // wiremock verifies expect(1) on drop
    }

    #[tokio::test]
    async fn short_lived_token_is_exchanged_every_time() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/oauth2/token"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "tok-short", "expires_in": 30}),
            ))
            .expect(2) // Inside the refresh margin, nothing is cached
            .mount(&mock_server)
            .await;

        let mgr = AccessTokenManager::new(Client::new(), &config(&mock_server.uri())).unwrap();
        assert_eq!(mgr.access_token().await.unwrap(), "tok-short");
        assert_eq!(mgr.access_token().await.unwrap(), "tok-short");
        // wiremock verifies both exchanges on drop
    }

    #[tokio::test]
    async fn rejected_credentials_surface_as_config_error() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/oauth2/token"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let mgr = AccessTokenManager::new(Client::new(), &config(&mock_server.uri())).unwrap();
        let err = mgr.access_token().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Config(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn basic_auth_header_sent() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/oauth2/token"))
            .and(wiremock::matchers::header(
                "Authorization",
                // base64("client-id:client-secret")
                "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "tok-abc", "expires_in": 100}),
            ))
            .mount(&mock_server)
            .await;

        let mgr = AccessTokenManager::new(Client::new(), &config(&mock_server.uri())).unwrap();
        assert_eq!(mgr.access_token().await.unwrap(), "tok-abc");
    }
}
