use serde_json::Value;

use crate::constants::REDIRECT_URL_POINTER;

/// Outcome of a successful pay call.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectResult {
    /// Hosted checkout URL. `None` when the gateway omitted it.
    pub redirect_url: Option<String>,
    /// The gateway's reply, untouched.
    pub body: Value,
}

impl RedirectResult {
    pub fn from_body(body: Value) -> Self {
        Self {
            redirect_url: extract_redirect_url(&body),
            body,
        }
    }
}

/// Read `data.instrumentResponse.redirectInfo.url`.
pub fn extract_redirect_url(body: &Value) -> Option<String> {
    body.pointer(REDIRECT_URL_POINTER)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// The `message` of a failed gateway reply, if it carries a non-empty one.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}
