use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::transaction::PayoutStatus;
use crate::error::Result;

/// What the processor reports it actually captured. These fields come from
/// the processor's response body, never from the caller's claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub capture_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub payer_email: Option<String>,
}

/// A single-recipient payout dispatch.
#[derive(Debug, Clone)]
pub struct PayoutRequest {
    /// Email-style identifier configured by the host.
    pub recipient: String,
    pub amount: Decimal,
    pub currency: String,
    /// Memo shown to the recipient.
    pub note: String,
    /// Idempotency key for the processor's batch API.
    pub sender_batch_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutAck {
    pub batch_id: Option<String>,
    pub status: PayoutStatus,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Capture a previously authorized order. Errors here mean no funds
    /// moved and the whole checkout may be retried with a fresh order.
    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult>;

    /// Dispatch the host's share. Callers treat any error as payout-failed;
    /// it must never unwind a completed capture.
    async fn send_payout(&self, request: &PayoutRequest) -> Result<PayoutAck>;
}
