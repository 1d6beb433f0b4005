use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// Lifecycle of a booking. This engine only ever produces `Paid`; the later
/// transitions belong to host/guest actions outside the checkout path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Paid,
    Accepted,
    Declined,
    Completed,
    Cancelled,
    Refunded,
}

impl BookingStatus {
    /// Whether a booking in this status keeps its dates off the calendar.
    pub fn blocks_dates(&self) -> bool {
        !matches!(self, Self::Declined | Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Paid => "paid",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BookingStatus {
    type Err = CheckoutError;

    /// Single normalization point for the status spellings observed in
    /// stored data ("canceled"/"cancelled", "complete"/"completed", any
    /// casing).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "completed" | "complete" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(CheckoutError::Store(format!(
                "unknown booking status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub guest_id: String,
    pub host_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub number_of_guests: u32,
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub net_amount: Decimal,
    pub platform_fee: Decimal,
    pub host_payout: Decimal,
    pub status: BookingStatus,
    pub coupon_code: Option<String>,
    pub transaction_id: String,
    pub payment_reference: String,
}

impl Booking {
    /// Half-open containment: the check-out day is not occupied.
    pub fn occupies(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }
}
