pub mod client;
pub mod token;

pub use client::PaypalGateway;
pub use token::AccessTokenManager;
