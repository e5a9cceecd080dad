use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::constants::{APPLICATION_JSON, DEFAULT_GATEWAY_ERROR, PAY_API_PATH, X_VERIFY};
use crate::error::CheckoutError;
use crate::gateway::PaymentGateway;
use crate::payment::EncodedPayload;
use crate::response::{error_message, RedirectResult};

/// Body of a pay call: `{"request": "<base64 payload>"}`.
#[derive(Serialize)]
struct PayEnvelope<'a> {
    request: &'a str,
}

/// reqwest-backed [`PaymentGateway`] for the PhonePe pay-page API.
///
/// Every call is bounded by the client timeout; an expired call surfaces as
/// [`CheckoutError::Transport`].
#[derive(Debug, Clone)]
pub struct PhonePeClient {
    http: reqwest::Client,
    pay_url: String,
}

impl PhonePeClient {
    pub fn new(host: &str, timeout: Duration) -> Result<Self, CheckoutError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckoutError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(http, host))
    }

    /// Use an existing client, e.g. one shared with other outbound calls.
    pub fn with_client(http: reqwest::Client, host: &str) -> Self {
        Self {
            http,
            pay_url: format!("{}{}", host.trim_end_matches('/'), PAY_API_PATH),
        }
    }

    pub fn pay_url(&self) -> &str {
        &self.pay_url
    }
}

impl PaymentGateway for PhonePeClient {
    async fn submit_payment(
        &self,
        payload: &EncodedPayload,
        checksum: &str,
    ) -> Result<RedirectResult, CheckoutError> {
        let body = serde_json::to_vec(&PayEnvelope {
            request: payload.as_str(),
        })?;

        let resp = self
            .http
            .post(&self.pay_url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(X_VERIFY, checksum)
            .header(ACCEPT, APPLICATION_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, timeout = e.is_timeout(), "gateway request failed");
                CheckoutError::Transport(e.to_string())
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read gateway response");
            CheckoutError::Transport(e.to_string())
        })?;
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();

        tracing::debug!(status = %status, body = ?parsed, "gateway response");

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| DEFAULT_GATEWAY_ERROR.to_string());
            tracing::warn!(status = status.as_u16(), message = %message, "gateway rejected payment");
            return Err(CheckoutError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let body = parsed.ok_or_else(|| {
            CheckoutError::MalformedResponse(format!(
                "expected a JSON body with status {}",
                status.as_u16()
            ))
        })?;

        Ok(RedirectResult::from_body(body))
    }
}
