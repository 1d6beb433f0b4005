pub mod paypal;
pub mod store;
