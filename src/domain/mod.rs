pub mod availability;
pub mod booking;
pub mod coupon;
pub mod listing;
pub mod pricing;
pub mod transaction;
