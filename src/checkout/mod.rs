pub mod service;

pub use service::{CheckoutDeps, CheckoutQuote, CheckoutService, SettlementOutcome, SettlementRequest};
