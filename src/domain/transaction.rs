use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of the payout dispatch for one settlement attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PayoutStatus {
    /// The processor accepted and completed the transfer immediately.
    Sent,
    /// The processor accepted the batch; final transfer status unknown.
    Pending,
    /// The dispatch call failed; the capture stands regardless.
    Failed,
}

impl PayoutStatus {
    /// Normalize the processor's batch-status vocabulary at the boundary.
    pub fn from_processor(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "SENT" | "COMPLETED" => Self::Sent,
            "PENDING" | "PROCESSING" | "NEW" => Self::Pending,
            _ => Self::Failed,
        }
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "payout-sent"),
            Self::Pending => write!(f, "payout-pending"),
            Self::Failed => write!(f, "payout-failed"),
        }
    }
}

/// One settlement attempt: a successful capture and what became of its
/// payout. Exists iff the capture succeeded; append-only once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub listing_id: String,
    pub host_id: String,
    pub guest_id: String,
    pub gross_amount: Decimal,
    pub currency: String,
    pub platform_fee: Decimal,
    pub host_payout: Decimal,
    pub capture_id: String,
    pub payout_batch_id: Option<String>,
    pub status: PayoutStatus,
    pub payout_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_statuses_normalize() {
        assert_eq!(PayoutStatus::from_processor("SUCCESS"), PayoutStatus::Sent);
        assert_eq!(PayoutStatus::from_processor("success"), PayoutStatus::Sent);
        assert_eq!(
            PayoutStatus::from_processor("PENDING"),
            PayoutStatus::Pending
        );
        assert_eq!(
            PayoutStatus::from_processor(" processing "),
            PayoutStatus::Pending
        );
        assert_eq!(PayoutStatus::from_processor("DENIED"), PayoutStatus::Failed);
        assert_eq!(PayoutStatus::from_processor(""), PayoutStatus::Failed);
    }

    #[test]
    fn payout_status_display() {
        assert_eq!(PayoutStatus::Sent.to_string(), "payout-sent");
        assert_eq!(PayoutStatus::Pending.to_string(), "payout-pending");
        assert_eq!(PayoutStatus::Failed.to_string(), "payout-failed");
    }
}
