use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::availability::ConflictKind;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid date range: {reason}")]
    InvalidRange { reason: String },

    #[error("Invalid stay: {reason}")]
    InvalidStay { reason: String },

    #[error("Dates unavailable: {kind} on {date}")]
    DateConflict { kind: ConflictKind, date: NaiveDate },

    #[error("Listing not found: {id}")]
    ListingNotFound { id: String },

    #[error("Coupon not found: {code}")]
    CouponNotFound { code: String },

    #[error("Coupon {code} does not belong to this guest")]
    CouponNotOwned { code: String },

    #[error("Coupon {code} has already been used")]
    CouponAlreadyUsed { code: String },

    #[error("Coupon {code} expired at {expired_at}")]
    CouponExpired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Payment capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("Captured amount {captured} does not match expected {expected}")]
    AmountMismatch { captured: Decimal, expected: Decimal },

    #[error("Captured currency {captured} does not match expected {expected}")]
    CurrencyMismatch { captured: String, expected: String },

    #[error("No payout destination configured for host {host_id}")]
    PayoutNotConfigured { host_id: String },

    #[error("Payout rejected by processor: {reason}")]
    PayoutRejected { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
