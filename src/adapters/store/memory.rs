use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::booking::Booking;
use crate::domain::coupon::Coupon;
use crate::domain::listing::Listing;
use crate::domain::transaction::Transaction;
use crate::error::{CheckoutError, Result};
use crate::ports::ledger::TransactionLedger;
use crate::ports::store::{BookingStore, CouponStore, HostDirectory, ListingStore};

/// In-memory persisted store. Bookings, coupons and payout destinations live
/// in `RwLock`-guarded maps; the transaction ledger is an append-only `Vec`
/// with no mutating accessors.
#[derive(Default)]
pub struct MemoryStore {
    listings: RwLock<HashMap<String, Listing>>,
    bookings: RwLock<Vec<Booking>>,
    coupons: RwLock<HashMap<String, Coupon>>,
    payout_destinations: RwLock<HashMap<String, String>>,
    ledger: RwLock<Vec<Transaction>>,
}

fn poisoned(what: &str) -> CheckoutError {
    CheckoutError::Store(format!("{what} lock poisoned"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_listing(&self, listing: Listing) -> Result<()> {
        self.listings
            .write()
            .map_err(|_| poisoned("listings"))?
            .insert(listing.id.clone(), listing);
        Ok(())
    }

    pub fn set_payout_destination(&self, host_id: &str, email: &str) -> Result<()> {
        self.payout_destinations
            .write()
            .map_err(|_| poisoned("payout destinations"))?
            .insert(host_id.to_string(), email.to_string());
        Ok(())
    }

    pub fn booking_by_id(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .map_err(|_| poisoned("bookings"))?
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    pub fn coupons_for_guest(&self, guest_id: &str) -> Result<Vec<Coupon>> {
        Ok(self
            .coupons
            .read()
            .map_err(|_| poisoned("coupons"))?
            .values()
            .filter(|c| c.owner_guest_id == guest_id)
            .cloned()
            .collect())
    }
}

fn ranges_overlap(a_in: NaiveDate, a_out: NaiveDate, b_in: NaiveDate, b_out: NaiveDate) -> bool {
    a_in < b_out && b_in < a_out
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn listing_by_id(&self, id: &str) -> Result<Option<Listing>> {
        Ok(self
            .listings
            .read()
            .map_err(|_| poisoned("listings"))?
            .get(id)
            .cloned())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn bookings_for_listing(&self, listing_id: &str) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .map_err(|_| poisoned("bookings"))?
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn insert_booking(&self, booking: Booking) -> Result<()> {
        let mut bookings = self.bookings.write().map_err(|_| poisoned("bookings"))?;
        // Conditional insert: the overlap check and the push share one
        // write-lock critical section.
        let clash = bookings.iter().find(|b| {
            b.listing_id == booking.listing_id
                && b.status.blocks_dates()
                && ranges_overlap(b.check_in, b.check_out, booking.check_in, booking.check_out)
        });
        if let Some(existing) = clash {
            let date = booking.check_in.max(existing.check_in);
            return Err(CheckoutError::DateConflict {
                kind: crate::domain::availability::ConflictKind::Booked,
                date,
            });
        }
        bookings.push(booking);
        Ok(())
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(self
            .coupons
            .read()
            .map_err(|_| poisoned("coupons"))?
            .get(code)
            .cloned())
    }

    async fn insert_coupon(&self, coupon: Coupon) -> Result<()> {
        self.coupons
            .write()
            .map_err(|_| poisoned("coupons"))?
            .insert(coupon.code.clone(), coupon);
        Ok(())
    }

    async fn mark_used(&self, code: &str, booking_id: &str) -> Result<()> {
        let mut coupons = self.coupons.write().map_err(|_| poisoned("coupons"))?;
        let coupon = coupons
            .get_mut(code)
            .ok_or_else(|| CheckoutError::CouponNotFound {
                code: code.to_string(),
            })?;
        if coupon.is_used {
            return Err(CheckoutError::CouponAlreadyUsed {
                code: code.to_string(),
            });
        }
        coupon.is_used = true;
        coupon.consumed_by_booking_id = Some(booking_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl HostDirectory for MemoryStore {
    async fn payout_destination(&self, host_id: &str) -> Result<Option<String>> {
        Ok(self
            .payout_destinations
            .read()
            .map_err(|_| poisoned("payout destinations"))?
            .get(host_id)
            .cloned())
    }
}

#[async_trait]
impl TransactionLedger for MemoryStore {
    async fn record(&self, transaction: Transaction) -> Result<String> {
        let id = transaction.id.clone();
        self.ledger
            .write()
            .map_err(|_| poisoned("ledger"))?
            .push(transaction);
        Ok(id)
    }

    async fn entries_for_listing(&self, listing_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .ledger
            .read()
            .map_err(|_| poisoned("ledger"))?
            .iter()
            .filter(|t| t.listing_id == listing_id)
            .cloned()
            .collect())
    }
}
