use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// A single-use, owner-scoped percentage discount with an expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub owner_guest_id: String,
    pub discount_percent: Decimal,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_by_booking_id: Option<String>,
}

impl Coupon {
    /// Loyalty reward issued after a completed booking.
    pub fn loyalty(
        owner_guest_id: &str,
        discount_percent: Decimal,
        valid_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code: generate_code(),
            owner_guest_id: owner_guest_id.to_string(),
            discount_percent,
            is_used: false,
            created_at: now,
            expires_at: now + Duration::days(valid_days),
            consumed_by_booking_id: None,
        }
    }

    /// Check ownership, unused state and expiry. Never mutates.
    pub fn ensure_usable_by(&self, guest_id: &str, now: DateTime<Utc>) -> Result<()> {
        if self.owner_guest_id != guest_id {
            return Err(CheckoutError::CouponNotOwned {
                code: self.code.clone(),
            });
        }
        if self.is_used {
            return Err(CheckoutError::CouponAlreadyUsed {
                code: self.code.clone(),
            });
        }
        if now >= self.expires_at {
            return Err(CheckoutError::CouponExpired {
                code: self.code.clone(),
                expired_at: self.expires_at,
            });
        }
        Ok(())
    }
}

/// Short human-pasteable code, e.g. `STAY-9F3A2C1B`.
fn generate_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("STAY-{}", &id[..8].to_ascii_uppercase())
}
