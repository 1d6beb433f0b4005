use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::coupon::Coupon;
use crate::domain::listing::Listing;
use crate::domain::transaction::{PayoutStatus, Transaction};
use crate::error::{CheckoutError, Result};
use crate::ports::payment_gateway::{CaptureResult, PayoutAck, PayoutRequest, PaymentGateway};

type CaptureFn = Box<dyn Fn(&str) -> Result<CaptureResult> + Send + Sync>;
type PayoutFn = Box<dyn Fn(&PayoutRequest) -> Result<PayoutAck> + Send + Sync>;

/// Closure-programmable gateway double for orchestrator tests.
pub struct MockGateway {
    capture_fn: Mutex<CaptureFn>,
    payout_fn: Mutex<PayoutFn>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            capture_fn: Mutex::new(Box::new(|_| {
                Err(CheckoutError::CaptureFailed {
                    reason: "mock capture not programmed".into(),
                })
            })),
            payout_fn: Mutex::new(Box::new(|_| {
                Ok(PayoutAck {
                    batch_id: Some("MOCK-BATCH".into()),
                    status: PayoutStatus::Sent,
                })
            })),
        }
    }

    #[must_use]
    pub fn with_capture(
        self,
        f: impl Fn(&str) -> Result<CaptureResult> + Send + Sync + 'static,
    ) -> Self {
        *self.capture_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_payout(
        self,
        f: impl Fn(&PayoutRequest) -> Result<PayoutAck> + Send + Sync + 'static,
    ) -> Self {
        *self.payout_fn.lock().unwrap() = Box::new(f);
        self
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult> {
        let f = self.capture_fn.lock().unwrap();
        f(order_id)
    }

    async fn send_payout(&self, request: &PayoutRequest) -> Result<PayoutAck> {
        let f = self.payout_fn.lock().unwrap();
        f(request)
    }
}

// --- Factory functions ---

pub fn make_listing(
    id: &str,
    host_id: &str,
    price_per_night: Decimal,
    discount_percent: Decimal,
) -> Listing {
    Listing {
        id: id.to_string(),
        host_id: host_id.to_string(),
        price_per_night,
        discount_percent,
        currency: "USD".to_string(),
        blocked_dates: vec![],
    }
}

pub fn make_booking(
    listing_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: BookingStatus,
) -> Booking {
    Booking {
        id: Uuid::new_v4().to_string(),
        listing_id: listing_id.to_string(),
        guest_id: "guest-1".to_string(),
        host_id: "host-1".to_string(),
        check_in,
        check_out,
        number_of_guests: 2,
        gross_amount: dec!(200.00),
        discount_amount: Decimal::ZERO,
        net_amount: dec!(200.00),
        platform_fee: dec!(10.00),
        host_payout: dec!(190.00),
        status,
        coupon_code: None,
        transaction_id: Uuid::new_v4().to_string(),
        payment_reference: "CAP-TEST".to_string(),
    }
}

/// 10% coupon owned by `owner`, valid for 30 days from `now`.
pub fn make_coupon(code: &str, owner: &str, now: DateTime<Utc>) -> Coupon {
    Coupon {
        code: code.to_string(),
        owner_guest_id: owner.to_string(),
        discount_percent: dec!(10),
        is_used: false,
        created_at: now,
        expires_at: now + Duration::days(30),
        consumed_by_booking_id: None,
    }
}

pub fn make_transaction(listing_id: &str, status: PayoutStatus) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        listing_id: listing_id.to_string(),
        host_id: "host-1".to_string(),
        guest_id: "guest-1".to_string(),
        gross_amount: dec!(200.00),
        currency: "USD".to_string(),
        platform_fee: dec!(10.00),
        host_payout: dec!(190.00),
        capture_id: "CAP-TEST".to_string(),
        payout_batch_id: None,
        status,
        payout_error: match status {
            PayoutStatus::Failed => Some("mock payout failure".to_string()),
            _ => None,
        },
        created_at: Utc::now(),
    }
}

pub fn make_capture(amount: Decimal, currency: &str) -> CaptureResult {
    CaptureResult {
        capture_id: "CAP-77".to_string(),
        amount,
        currency: currency.to_string(),
        payer_email: Some("guest@example.com".to_string()),
    }
}
