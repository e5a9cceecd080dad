use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use checkout::CheckoutError;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Failure while building, signing or submitting a payment
    Checkout(CheckoutError),
    /// Malformed request (body or path)
    BadRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Checkout(e) => write!(f, "{}", e),
            ApiError::BadRequest(msg) => write!(f, "bad request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        ApiError::Checkout(e)
    }
}

impl ApiError {
    /// The `error` string returned to the client.
    fn client_message(&self) -> String {
        match self {
            ApiError::Checkout(e) => e.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Checkout(CheckoutError::InvalidAmount) => StatusCode::BAD_REQUEST,
            ApiError::Checkout(CheckoutError::Gateway { status, .. }) => {
                // Only 4xx/5xx are mirrored
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Checkout(CheckoutError::MalformedResponse(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Checkout(CheckoutError::Transport(_))
            | ApiError::Checkout(CheckoutError::Serialization(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.client_message()
        }))
    }
}
