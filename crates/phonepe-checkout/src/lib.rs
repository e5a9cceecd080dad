//! Signed pay-page requests for the PhonePe payment gateway.
//!
//! A payment is initiated in three steps:
//!
//! - **Build** ([`build_payment_request`]) — validates the amount, converts it to
//!   paise and generates fresh transaction/user identifiers
//! - **Sign** ([`checksum::sign`]) — derives the `X-VERIFY` checksum over the
//!   base64 payload, the API path and the salt key
//! - **Submit** ([`PaymentGateway`]) — posts the envelope to `/pg/v1/pay` and
//!   extracts the hosted checkout URL from the reply
//!
//! [`initiate_payment`] runs all three against any [`PaymentGateway`];
//! [`PhonePeClient`] is the reqwest-backed implementation.
//!
//! # Quick example
//!
//! ```no_run
//! use std::time::Duration;
//! use checkout::{initiate_payment, MerchantConfig, PhonePeClient};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let merchant = MerchantConfig {
//!     merchant_id: "PGTESTPAYUAT".to_string(),
//!     salt_key: "your-salt-key".to_string(),
//!     salt_index: "1".to_string(),
//!     public_base_url: "https://relay.example.com".to_string(),
//! };
//! let client = PhonePeClient::new(
//!     "https://api-preprod.phonepe.com/apis/pg-sandbox",
//!     Duration::from_secs(30),
//! )
//! .unwrap();
//!
//! let initiated = initiate_payment(&client, &merchant, 100.0).await.unwrap();
//! println!("{:?}", initiated.result.redirect_url);
//! # }
//! ```

pub mod checksum;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod payment;
pub mod response;
pub mod security;

pub use constants::*;
pub use error::CheckoutError;
pub use gateway::{initiate_payment, Initiated, PaymentGateway};
pub use http_client::PhonePeClient;
pub use payment::{
    build_payment_request, parse_amount, to_subunits, EncodedPayload, MerchantConfig,
    MerchantUserId, PaymentInstrument, PaymentRequest, TransactionId,
};
pub use response::RedirectResult;
