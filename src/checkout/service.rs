use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::types::FeeConfig;
use crate::domain::availability::{StayRange, find_conflict};
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::coupon::Coupon;
use crate::domain::pricing::{Quote, quote_stay, split_net};
use crate::domain::transaction::{PayoutStatus, Transaction};
use crate::error::{CheckoutError, Result};
use crate::ports::ledger::TransactionLedger;
use crate::ports::payment_gateway::{PaymentGateway, PayoutRequest};
use crate::ports::store::{BookingStore, CouponStore, HostDirectory, ListingStore};

/// Captured-vs-expected tolerance: anything beyond one cent is treated as
/// tampering, not rounding.
const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

const PAYOUT_WARNING: &str =
    "Your booking is confirmed, but the host payout could not be dispatched. \
     Support has been notified and will settle it manually.";

/// Priced, conflict-free stay offered to the guest before authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutQuote {
    pub nights: i64,
    pub nightly_rate: Decimal,
    pub total_price: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct SettlementRequest {
    /// Processor order already created and authorized by the guest.
    pub order_id: String,
    pub listing_id: String,
    pub guest_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub number_of_guests: u32,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub booking_id: String,
    pub transaction_id: String,
    pub capture_id: String,
    pub payout_status: PayoutStatus,
    pub payout_batch_id: Option<String>,
    pub platform_fee: Decimal,
    pub host_payout: Decimal,
    /// Soft warning attached to a confirmed booking; never a failure.
    pub payout_warning: Option<String>,
    pub payout_error: Option<String>,
}

/// Port bundle for the checkout engine.
pub struct CheckoutDeps {
    pub listings: Arc<dyn ListingStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub coupons: Arc<dyn CouponStore>,
    pub hosts: Arc<dyn HostDirectory>,
    pub ledger: Arc<dyn TransactionLedger>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Orchestrates one checkout: availability, pricing, capture, settlement
/// split, payout dispatch, ledger entry and booking/coupon lifecycle.
pub struct CheckoutService {
    deps: CheckoutDeps,
    platform_fee_percent: Decimal,
    loyalty_coupon_percent: Decimal,
    loyalty_coupon_valid_days: i64,
}

impl CheckoutService {
    pub fn new(deps: CheckoutDeps, fees: &FeeConfig) -> Result<Self> {
        let platform_fee_percent = decimal_percent(fees.platform_fee_percent, "platform_fee_percent")?;
        let loyalty_coupon_percent =
            decimal_percent(fees.loyalty_coupon_percent, "loyalty_coupon_percent")?;
        Ok(Self {
            deps,
            platform_fee_percent,
            loyalty_coupon_percent,
            loyalty_coupon_valid_days: fees.loyalty_coupon_valid_days,
        })
    }

    /// Validate dates against the listing calendar and price the stay.
    /// No external calls beyond the store; safe to retry freely.
    pub async fn prepare_checkout(
        &self,
        listing_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        number_of_guests: u32,
    ) -> Result<CheckoutQuote> {
        let listing = self.load_listing(listing_id).await?;
        let range = StayRange::new(check_in, check_out)?;
        ensure_guest_count(number_of_guests)?;

        let bookings = self.deps.bookings.bookings_for_listing(listing_id).await?;
        if let Some(conflict) = find_conflict(&range, &bookings, &listing.blocked_dates) {
            return Err(CheckoutError::DateConflict {
                kind: conflict.kind,
                date: conflict.date,
            });
        }

        let quote = quote_stay(
            listing.price_per_night,
            listing.discount_percent,
            range.nights(),
            None,
        )?;

        debug!(
            listing_id,
            nights = quote.nights,
            total = %quote.gross_amount,
            "Checkout prepared"
        );

        Ok(CheckoutQuote {
            nights: quote.nights,
            nightly_rate: quote.nightly_rate,
            total_price: quote.gross_amount,
            currency: listing.currency,
        })
    }

    /// Validate a coupon for this guest and return its discount percent.
    /// Never marks the coupon used.
    pub async fn apply_coupon(&self, code: &str, guest_id: &str) -> Result<Decimal> {
        let coupon = self.load_coupon(code).await?;
        coupon.ensure_usable_by(guest_id, Utc::now())?;
        Ok(coupon.discount_percent)
    }

    /// Capture the guest's authorized order and settle it.
    ///
    /// Everything up to the capture call is free of side effects and safe to
    /// retry. Once the capture succeeds the flow always runs to completion:
    /// payout failures and post-capture store failures are recorded as data
    /// and surfaced as warnings, never as errors that would orphan captured
    /// funds.
    pub async fn settle_payment(&self, request: SettlementRequest) -> Result<SettlementOutcome> {
        let listing = self.load_listing(&request.listing_id).await?;
        let range = StayRange::new(request.check_in, request.check_out)?;
        ensure_guest_count(request.number_of_guests)?;

        // Advisory re-check right before funds move; the store's conditional
        // insert closes the remaining window.
        let bookings = self
            .deps
            .bookings
            .bookings_for_listing(&request.listing_id)
            .await?;
        if let Some(conflict) = find_conflict(&range, &bookings, &listing.blocked_dates) {
            return Err(CheckoutError::DateConflict {
                kind: conflict.kind,
                date: conflict.date,
            });
        }

        let coupon = match &request.coupon_code {
            Some(code) => {
                let coupon = self.load_coupon(code).await?;
                coupon.ensure_usable_by(&request.guest_id, Utc::now())?;
                Some(coupon)
            }
            None => None,
        };

        // The expected net is recomputed from stored state, never taken
        // from the client.
        let quote = quote_stay(
            listing.price_per_night,
            listing.discount_percent,
            range.nights(),
            coupon.as_ref().map(|c| c.discount_percent),
        )?;

        // Never capture funds that cannot be forwarded.
        let destination = self
            .deps
            .hosts
            .payout_destination(&listing.host_id)
            .await?
            .ok_or_else(|| CheckoutError::PayoutNotConfigured {
                host_id: listing.host_id.clone(),
            })?;

        let capture = self.deps.gateway.capture_order(&request.order_id).await?;
        verify_capture(&capture.amount, &capture.currency, &quote, &listing.currency)?;

        // ---- Funds have moved. No early returns from here on. ----

        let split = split_net(quote.net_amount, self.platform_fee_percent);
        let booking_id = Uuid::new_v4().to_string();
        let transaction_id = Uuid::new_v4().to_string();

        let payout_request = PayoutRequest {
            recipient: destination,
            amount: split.host_payout,
            currency: listing.currency.clone(),
            note: format!(
                "Payout for booking {booking_id}, stay {} to {}",
                range.check_in(),
                range.check_out()
            ),
            sender_batch_id: transaction_id.clone(),
        };

        let (payout_batch_id, payout_status, payout_error) =
            match self.deps.gateway.send_payout(&payout_request).await {
                Ok(ack) => (ack.batch_id, ack.status, None),
                Err(e) => {
                    warn!(
                        booking_id = %booking_id,
                        host_id = %listing.host_id,
                        error = %e,
                        "Payout dispatch failed; capture stands, continuing settlement"
                    );
                    (None, PayoutStatus::Failed, Some(e.to_string()))
                }
            };

        let mut warnings: Vec<String> = Vec::new();
        if payout_status == PayoutStatus::Failed {
            warnings.push(PAYOUT_WARNING.to_string());
        }

        let transaction = Transaction {
            id: transaction_id.clone(),
            listing_id: listing.id.clone(),
            host_id: listing.host_id.clone(),
            guest_id: request.guest_id.clone(),
            gross_amount: capture.amount,
            currency: capture.currency.clone(),
            platform_fee: split.platform_fee,
            host_payout: split.host_payout,
            capture_id: capture.capture_id.clone(),
            payout_batch_id: payout_batch_id.clone(),
            status: payout_status,
            payout_error: payout_error.clone(),
            created_at: Utc::now(),
        };
        let transaction_id = match self.deps.ledger.record(transaction).await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    transaction_id = %transaction_id,
                    capture_id = %capture.capture_id,
                    error = %e,
                    "Ledger write failed after capture; continuing settlement"
                );
                warnings.push(
                    "The payment could not be written to the transaction log; \
                     support has been notified."
                        .to_string(),
                );
                transaction_id
            }
        };

        let booking = Booking {
            id: booking_id.clone(),
            listing_id: listing.id.clone(),
            guest_id: request.guest_id.clone(),
            host_id: listing.host_id.clone(),
            check_in: range.check_in(),
            check_out: range.check_out(),
            number_of_guests: request.number_of_guests,
            gross_amount: quote.gross_amount,
            discount_amount: quote.discount_amount,
            net_amount: quote.net_amount,
            platform_fee: split.platform_fee,
            host_payout: split.host_payout,
            status: BookingStatus::Paid,
            coupon_code: request.coupon_code.clone(),
            transaction_id: transaction_id.clone(),
            payment_reference: capture.capture_id.clone(),
        };
        let booking_created = match self.deps.bookings.insert_booking(booking).await {
            Ok(()) => true,
            Err(e) => {
                // A lost race surfaces here as a conditional-insert conflict.
                error!(
                    booking_id = %booking_id,
                    capture_id = %capture.capture_id,
                    error = %e,
                    "Booking creation failed after capture; funds held for manual reconciliation"
                );
                warnings.push(
                    "Your payment was captured but the reservation could not be \
                     created; support has been notified and will reconcile or refund."
                        .to_string(),
                );
                false
            }
        };

        // Consumed only once the booking row exists; a settlement without a
        // reservation must not burn the coupon.
        if booking_created && let Some(coupon) = &coupon {
            if let Err(e) = self.deps.coupons.mark_used(&coupon.code, &booking_id).await {
                error!(
                    code = %coupon.code,
                    booking_id = %booking_id,
                    error = %e,
                    "Could not mark coupon used after booking creation"
                );
                warnings.push(format!(
                    "Coupon {} could not be marked as used; support has been notified.",
                    coupon.code
                ));
            }
        }

        self.issue_loyalty_coupon(&request.guest_id).await;

        info!(
            booking_id = %booking_id,
            transaction_id = %transaction_id,
            capture_id = %capture.capture_id,
            payout_status = %payout_status,
            "Settlement complete"
        );

        Ok(SettlementOutcome {
            booking_id,
            transaction_id,
            capture_id: capture.capture_id,
            payout_status,
            payout_batch_id,
            platform_fee: split.platform_fee,
            host_payout: split.host_payout,
            payout_warning: if warnings.is_empty() {
                None
            } else {
                Some(warnings.join(" "))
            },
            payout_error,
        })
    }

    /// Best-effort loyalty reward. A failure is logged and forgotten; the
    /// booking is already confirmed.
    async fn issue_loyalty_coupon(&self, guest_id: &str) {
        let coupon = Coupon::loyalty(
            guest_id,
            self.loyalty_coupon_percent,
            self.loyalty_coupon_valid_days,
            Utc::now(),
        );
        let code = coupon.code.clone();
        match self.deps.coupons.insert_coupon(coupon).await {
            Ok(()) => debug!(guest_id, code = %code, "Loyalty coupon issued"),
            Err(e) => warn!(guest_id, error = %e, "Loyalty coupon issuance failed"),
        }
    }

    async fn load_listing(&self, id: &str) -> Result<crate::domain::listing::Listing> {
        self.deps
            .listings
            .listing_by_id(id)
            .await?
            .ok_or_else(|| CheckoutError::ListingNotFound { id: id.to_string() })
    }

    async fn load_coupon(&self, code: &str) -> Result<Coupon> {
        self.deps
            .coupons
            .coupon_by_code(code)
            .await?
            .ok_or_else(|| CheckoutError::CouponNotFound {
                code: code.to_string(),
            })
    }
}

fn ensure_guest_count(number_of_guests: u32) -> Result<()> {
    if number_of_guests < 1 {
        return Err(CheckoutError::InvalidStay {
            reason: "at least one guest is required".into(),
        });
    }
    Ok(())
}

fn verify_capture(
    captured_amount: &Decimal,
    captured_currency: &str,
    quote: &Quote,
    expected_currency: &str,
) -> Result<()> {
    if (*captured_amount - quote.net_amount).abs() > AMOUNT_TOLERANCE {
        return Err(CheckoutError::AmountMismatch {
            captured: *captured_amount,
            expected: quote.net_amount,
        });
    }
    if !captured_currency.eq_ignore_ascii_case(expected_currency) {
        return Err(CheckoutError::CurrencyMismatch {
            captured: captured_currency.to_string(),
            expected: expected_currency.to_string(),
        });
    }
    Ok(())
}

fn decimal_percent(value: f64, field: &str) -> Result<Decimal> {
    Decimal::try_from(value)
        .map_err(|e| CheckoutError::Config(format!("invalid {field} '{value}': {e}")))
}
