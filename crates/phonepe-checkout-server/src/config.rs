use std::env;
use std::str::FromStr;
use std::time::Duration;

use checkout::MerchantConfig;
use url::Url;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT_RPM: u32 = 600;

/// Shape of a successful `POST /pay` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// `{"success": true, "redirectUrl": ...}`
    #[default]
    Redirect,
    /// The gateway's JSON body with `redirectUrl` merged in
    Passthrough,
}

impl FromStr for ResponseMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(ResponseMode::Redirect),
            "passthrough" => Ok(ResponseMode::Passthrough),
            other => Err(ConfigError::InvalidValue("RESPONSE_MODE", other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct CheckoutConfig {
    /// PhonePe merchant id
    pub merchant_id: String,
    /// Salt key for the X-VERIFY checksum
    pub salt_key: String,
    /// Index of the salt key
    pub salt_index: String,
    /// Gateway base URL, e.g. https://api-preprod.phonepe.com/apis/pg-sandbox
    pub phonepe_host: String,
    /// Public base URL of this service (post-payment redirects land here)
    pub public_base_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound on a single gateway call
    pub gateway_timeout: Duration,
    pub response_mode: ResponseMode,
    /// CORS allowed origins (`*` allows any)
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"[REDACTED]")
            .field("salt_index", &self.salt_index)
            .field("phonepe_host", &self.phonepe_host)
            .field("public_base_url", &self.public_base_url)
            .field("port", &self.port)
            .field("gateway_timeout", &self.gateway_timeout)
            .field("response_mode", &self.response_mode)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CheckoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingRequired(key));

        // Required: merchant credentials
        let merchant_id = required("MERCHANT_ID")?;
        let salt_key = required("SALT_KEY")?;
        let salt_index = required("SALT_INDEX")?;

        // Required: gateway host and our own public URL
        let phonepe_host = required("PHONEPE_HOST")?;
        Url::parse(&phonepe_host).map_err(|_| ConfigError::InvalidUrl(phonepe_host.clone()))?;

        let public_base_url = required("PUBLIC_BASE_URL")?;
        Url::parse(&public_base_url)
            .map_err(|_| ConfigError::InvalidUrl(public_base_url.clone()))?;

        // Optional: port
        let port = match get("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", p))?,
            None => DEFAULT_PORT,
        };

        // Optional: gateway timeout
        let timeout_secs = match get("GATEWAY_TIMEOUT_SECS") {
            Some(t) => t
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS", t))?,
            None => DEFAULT_GATEWAY_TIMEOUT_SECS,
        };

        // Optional: response shape
        let response_mode = match get("RESPONSE_MODE") {
            Some(mode) => mode.parse()?,
            None => ResponseMode::default(),
        };

        // Optional: allowed origins
        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        // Optional: rate limit
        let rate_limit_rpm = match get("RATE_LIMIT_RPM") {
            Some(r) => r
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|rpm| *rpm > 0)
                .ok_or(ConfigError::InvalidValue("RATE_LIMIT_RPM", r))?,
            None => DEFAULT_RATE_LIMIT_RPM,
        };

        // Optional: metrics token
        let metrics_token = get("METRICS_TOKEN");

        if salt_key.len() < 16 {
            tracing::warn!(
                "SALT_KEY is only {} bytes long; check it was copied in full from the PhonePe dashboard",
                salt_key.len()
            );
        }

        if allowed_origins.iter().any(|o| o == "*") {
            tracing::warn!("CORS allows any origin; set ALLOWED_ORIGINS to restrict it");
        }

        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set — /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            merchant_id,
            salt_key,
            salt_index,
            phonepe_host,
            public_base_url,
            port,
            gateway_timeout: Duration::from_secs(timeout_secs),
            response_mode,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }

    /// Credentials and redirect base handed to the payment builder and signer.
    pub fn merchant(&self) -> MerchantConfig {
        MerchantConfig {
            merchant_id: self.merchant_id.clone(),
            salt_key: self.salt_key.clone(),
            salt_index: self.salt_index.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
