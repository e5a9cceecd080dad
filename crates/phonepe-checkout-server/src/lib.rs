//! HTTP relay for PhonePe pay-page payments.
//!
//! `POST /pay` builds and signs a pay request with the [`checkout`] crate,
//! submits it, and returns the hosted checkout URL. The gateway sends the payer
//! back to `/status/{id}` when payment completes.
//!
//! # Modules
//!
//! - [`config`] — Environment configuration ([`CheckoutConfig`])
//! - [`routes`] — `/pay`, `/status/{id}`, `/`, `/health`, `/metrics`
//! - [`state`] — Shared [`AppState`], generic over the gateway
//! - [`error`] — Mapping of payment failures to HTTP responses
//! - [`metrics`] — Prometheus counters for payment initiation

pub mod config;
pub mod cors;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::{CheckoutConfig, ResponseMode};
pub use error::ApiError;
pub use state::AppState;
