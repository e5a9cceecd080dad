use actix_web::{web, HttpResponse};
use checkout::TransactionId;

use crate::error::ApiError;
use crate::metrics;

/// POST /status/{id} - Post-payment redirect target
///
/// Acknowledges the transaction id without checking the payment outcome.
/// Ids outside `[A-Za-z0-9_-]` are rejected, never echoed.
pub async fn payment_status(path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let transaction_id = TransactionId::parse(&id)
        .ok_or_else(|| ApiError::BadRequest("invalid transaction id".to_string()))?;

    metrics::STATUS_CALLBACKS.inc();
    tracing::info!(transaction_id = %transaction_id, "payment redirect received");

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<h2>Payment Processed for Transaction ID: {transaction_id}</h2>"
        )))
}

/// Configure status routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/status/{id}")
            .route(web::post().to(payment_status))
            .route(web::get().to(payment_status)),
    );
}
