pub mod ledger;
pub mod payment_gateway;
pub mod store;
