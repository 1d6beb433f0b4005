use std::str::FromStr as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::types::GatewayConfig;
use crate::domain::transaction::PayoutStatus;
use crate::error::{CheckoutError, Result};
use crate::ports::payment_gateway::{CaptureResult, PayoutAck, PayoutRequest, PaymentGateway};

use super::token::AccessTokenManager;

/// REST gateway for the payment processor's order-capture and payouts APIs.
pub struct PaypalGateway {
    http: Client,
    base_url: String,
    tokens: Arc<AccessTokenManager>,
}

impl PaypalGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let tokens = Arc::new(AccessTokenManager::new(http.clone(), config)?);
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Build a gateway sharing an existing token manager.
    pub fn with_token_manager(
        http: Client,
        base_url: &str,
        tokens: Arc<AccessTokenManager>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

// ---------- Capture response shapes ----------

#[derive(Deserialize)]
struct CaptureResponse {
    status: Option<String>,
    payer: Option<Payer>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Deserialize)]
struct Payer {
    email_address: Option<String>,
}

#[derive(Deserialize)]
struct PurchaseUnit {
    payments: Option<Payments>,
}

#[derive(Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Deserialize)]
struct Capture {
    id: String,
    amount: Amount,
}

#[derive(Deserialize)]
struct Amount {
    value: String,
    currency_code: String,
}

// ---------- Payout response shapes ----------

#[derive(Deserialize)]
struct PayoutResponse {
    batch_header: Option<BatchHeader>,
}

#[derive(Deserialize)]
struct BatchHeader {
    payout_batch_id: Option<String>,
    batch_status: Option<String>,
}

fn capture_failed(reason: impl Into<String>) -> CheckoutError {
    CheckoutError::CaptureFailed {
        reason: reason.into(),
    }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/v2/checkout/orders/{order_id}/capture", self.base_url);

        debug!(order_id, "Capturing processor order");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .body("{}")
            .send()
            .await
            .map_err(|e| capture_failed(format!("capture request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(capture_failed(format!("capture returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| capture_failed(format!("capture response unreadable: {e}")))?;
        trace!(order_id, body = %body, "Capture raw response");

        let parsed: CaptureResponse = serde_json::from_str(&body)
            .map_err(|e| capture_failed(format!("capture response parse error: {e}")))?;

        let order_status = parsed.status.unwrap_or_default();
        if order_status != "COMPLETED" {
            return Err(capture_failed(format!(
                "capture not completed, processor reports '{order_status}'"
            )));
        }

        // The captured amount comes from the processor's record of the
        // capture, never from what the caller claims was paid.
        let capture = parsed
            .purchase_units
            .into_iter()
            .find_map(|u| u.payments)
            .and_then(|p| p.captures.into_iter().next())
            .ok_or_else(|| capture_failed("capture response carries no capture record"))?;

        let amount = Decimal::from_str(&capture.amount.value).map_err(|e| {
            capture_failed(format!(
                "unparseable captured amount '{}': {e}",
                capture.amount.value
            ))
        })?;

        debug!(
            order_id,
            capture_id = %capture.id,
            %amount,
            currency = %capture.amount.currency_code,
            "Capture completed"
        );

        Ok(CaptureResult {
            capture_id: capture.id,
            amount,
            currency: capture.amount.currency_code,
            payer_email: parsed.payer.and_then(|p| p.email_address),
        })
    }

    async fn send_payout(&self, request: &PayoutRequest) -> Result<PayoutAck> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/v1/payments/payouts", self.base_url);

        let body = serde_json::json!({
            "sender_batch_header": {
                "sender_batch_id": request.sender_batch_id,
                "email_subject": "You have received a payout",
            },
            "items": [{
                "recipient_type": "EMAIL",
                "receiver": request.recipient,
                "amount": {
                    "value": request.amount.to_string(),
                    "currency": request.currency,
                },
                "note": request.note,
                "sender_item_id": request.sender_batch_id,
            }]
        });

        debug!(
            recipient = %request.recipient,
            amount = %request.amount,
            "Dispatching payout"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(CheckoutError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::PayoutRejected {
                reason: format!("payouts endpoint returned HTTP {status}"),
            });
        }

        let parsed: PayoutResponse = response.json().await.map_err(CheckoutError::Http)?;
        let header = parsed.batch_header.unwrap_or(BatchHeader {
            payout_batch_id: None,
            batch_status: None,
        });
        let raw_status = header.batch_status.unwrap_or_default();
        let payout_status = PayoutStatus::from_processor(&raw_status);

        if payout_status == PayoutStatus::Failed {
            return Err(CheckoutError::PayoutRejected {
                reason: format!("processor reported batch status '{raw_status}'"),
            });
        }

        debug!(
            batch_id = header.payout_batch_id.as_deref().unwrap_or("-"),
            status = %payout_status,
            "Payout accepted"
        );

        Ok(PayoutAck {
            batch_id: header.payout_batch_id,
            status: payout_status,
        })
    }
}
