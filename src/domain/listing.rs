use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bookable stay. Availability is derived from bookings at query time;
/// only host-disabled dates are stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub host_id: String,
    pub price_per_night: Decimal,
    /// Listing-level discount applied to the nightly rate, in percent.
    #[serde(default)]
    pub discount_percent: Decimal,
    pub currency: String,
    #[serde(default)]
    pub blocked_dates: Vec<NaiveDate>,
}
