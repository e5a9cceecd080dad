use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    MAX_CALLBACK_ID_LEN, MAX_SUBUNITS, PAY_PAGE, REDIRECT_MODE_POST, SUBUNITS_PER_UNIT,
    TRANSACTION_ID_PREFIX, USER_ID_PREFIX,
};
use crate::error::CheckoutError;

/// Merchant identity and signing credentials, fixed for the process lifetime.
#[derive(Clone)]
pub struct MerchantConfig {
    pub merchant_id: String,
    /// Shared secret used in the checksum
    pub salt_key: String,
    /// Version of `salt_key`, sent after `###`
    pub salt_index: String,
    /// Base URL of this service, used to build the post-payment redirect
    pub public_base_url: String,
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"[REDACTED]")
            .field("salt_index", &self.salt_index)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

/// Pay-page request payload. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub merchant_id: String,
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    /// Amount in paise
    pub amount: u64,
    pub redirect_url: String,
    pub redirect_mode: String,
    pub payment_instrument: PaymentInstrument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    #[serde(rename = "type")]
    pub instrument_type: String,
}

impl PaymentRequest {
    /// Serialize once and base64-encode the resulting bytes.
    pub fn encode(&self) -> Result<EncodedPayload, CheckoutError> {
        let json = serde_json::to_vec(self)?;
        let base64 = base64::engine::general_purpose::STANDARD.encode(&json);
        Ok(EncodedPayload { json, base64 })
    }
}

/// The exact bytes that are signed and sent. Built only by [`PaymentRequest::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    json: Vec<u8>,
    base64: String,
}

impl EncodedPayload {
    /// The base64 string placed in the `request` envelope field.
    pub fn as_str(&self) -> &str {
        &self.base64
    }

    /// The canonical JSON the base64 string was produced from.
    pub fn json(&self) -> &[u8] {
        &self.json
    }
}

/// Parse a JSON amount (number or numeric string) into a positive, finite value.
pub fn parse_amount(value: &Value) -> Result<f64, CheckoutError> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or(CheckoutError::InvalidAmount)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(CheckoutError::InvalidAmount);
    }
    Ok(amount)
}

/// Convert an amount in rupees to paise, rounding half up.
pub fn to_subunits(amount: f64) -> Result<u64, CheckoutError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CheckoutError::InvalidAmount);
    }
    let subunits = (amount * SUBUNITS_PER_UNIT + 0.5).floor();
    if subunits > MAX_SUBUNITS as f64 {
        return Err(CheckoutError::InvalidAmount);
    }
    Ok(subunits as u64)
}

/// Build the pay-page payload for `amount` rupees.
pub fn build_payment_request(
    amount: f64,
    merchant: &MerchantConfig,
) -> Result<(PaymentRequest, TransactionId), CheckoutError> {
    let amount = to_subunits(amount)?;
    let transaction_id = TransactionId::generate();
    let user_id = MerchantUserId::generate();

    let request = PaymentRequest {
        merchant_id: merchant.merchant_id.clone(),
        merchant_transaction_id: transaction_id.to_string(),
        merchant_user_id: user_id.to_string(),
        amount,
        redirect_url: format!(
            "{}/status/{}",
            merchant.public_base_url.trim_end_matches('/'),
            transaction_id
        ),
        redirect_mode: REDIRECT_MODE_POST.to_string(),
        payment_instrument: PaymentInstrument {
            instrument_type: PAY_PAGE.to_string(),
        },
    };
    Ok((request, transaction_id))
}

/// Identifier correlating a payment with the gateway and the `/status/{id}` callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// `TID-<epoch millis>-<8 random hex>`
    pub fn generate() -> Self {
        Self(unique_id(TRANSACTION_ID_PREFIX))
    }

    /// Accept an id from the callback path. Only `[A-Za-z0-9_-]` is allowed,
    /// so the value is safe to place in an HTML response.
    pub fn parse(id: &str) -> Option<Self> {
        let valid = !id.is_empty()
            && id.len() <= MAX_CALLBACK_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantUserId(String);

impl MerchantUserId {
    /// `MUID-<epoch millis>-<8 random hex>`
    pub fn generate() -> Self {
        Self(unique_id(USER_ID_PREFIX))
    }
}

impl fmt::Display for MerchantUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clock reading plus a CSPRNG suffix; ids minted in the same millisecond differ.
fn unique_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{millis}-{}", &random[..8])
}
