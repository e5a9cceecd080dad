use thiserror::Error;

/// Errors returned while initiating a payment.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Invalid amount. Must be a positive number.")]
    InvalidAmount,

    /// The gateway answered with a non-success status.
    #[error("{message}")]
    Gateway { status: u16, message: String },

    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Short stable label, used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::InvalidAmount => "invalid_amount",
            CheckoutError::Gateway { .. } => "gateway_error",
            CheckoutError::MalformedResponse(_) => "malformed_response",
            CheckoutError::Transport(_) => "transport_error",
            CheckoutError::Serialization(_) => "serialization_error",
        }
    }
}
