use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::coupon::Coupon;
use crate::domain::listing::Listing;
use crate::error::Result;

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn listing_by_id(&self, id: &str) -> Result<Option<Listing>>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All bookings for a listing, regardless of status. Overlap filtering
    /// happens in the domain layer.
    async fn bookings_for_listing(&self, listing_id: &str) -> Result<Vec<Booking>>;

    /// Conditional insert: implementations must reject a booking whose date
    /// range overlaps an active booking on the same listing, atomically
    /// with the insert itself.
    async fn insert_booking(&self, booking: Booking) -> Result<()>;
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>>;
    async fn insert_coupon(&self, coupon: Coupon) -> Result<()>;

    /// Mark a coupon consumed by the given booking. Called only after the
    /// booking row exists; a failed payment must never burn a coupon.
    async fn mark_used(&self, code: &str, booking_id: &str) -> Result<()>;
}

#[async_trait]
pub trait HostDirectory: Send + Sync {
    /// The host's configured payout destination (an email-style processor
    /// identifier), if any.
    async fn payout_destination(&self, host_id: &str) -> Result<Option<String>>;
}
