/// Path of the pay-page API. Signed verbatim, independent of the host.
pub const PAY_API_PATH: &str = "/pg/v1/pay";

/// Separates the hex digest from the salt index in an `X-VERIFY` value.
pub const CHECKSUM_SEPARATOR: &str = "###";

/// Header carrying the request checksum.
pub const X_VERIFY: &str = "X-VERIFY";

pub const APPLICATION_JSON: &str = "application/json";

/// Instrument type for the gateway-hosted checkout page.
pub const PAY_PAGE: &str = "PAY_PAGE";

/// The gateway posts the payer back to `redirectUrl` when payment completes.
pub const REDIRECT_MODE_POST: &str = "POST";

pub const TRANSACTION_ID_PREFIX: &str = "TID-";
pub const USER_ID_PREFIX: &str = "MUID-";

/// Gateway limit on `merchantTransactionId` length.
pub const MAX_TRANSACTION_ID_LEN: usize = 38;

/// Longest id accepted on the `/status/{id}` route.
pub const MAX_CALLBACK_ID_LEN: usize = 64;

/// Paise per rupee.
pub const SUBUNITS_PER_UNIT: f64 = 100.0;

/// Largest subunit amount that survives a round trip through a JSON number.
pub const MAX_SUBUNITS: u64 = 9_007_199_254_740_991;

/// Used when a failed gateway reply carries no `message`.
pub const DEFAULT_GATEWAY_ERROR: &str = "PhonePe API error";

/// Pointer to the hosted checkout URL inside a successful pay response.
pub const REDIRECT_URL_POINTER: &str = "/data/instrumentResponse/redirectInfo/url";
