use actix_web::{web, HttpRequest, HttpResponse};
use checkout::security::constant_time_eq;
use checkout::PaymentGateway;

use crate::metrics::metrics_output;
use crate::state::AppState;

/// GET / - Liveness text
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("PhonePe checkout relay is running")
}

/// GET /health - Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "phonepe-checkout-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics - Prometheus metrics endpoint (optionally auth-gated)
pub async fn metrics<G: PaymentGateway + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<G>>,
) -> HttpResponse {
    // Check bearer token if METRICS_TOKEN is configured
    if let Some(ref expected_token) = state.config.metrics_token {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()))
            .unwrap_or(false);

        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
                "message": "Valid Bearer token required for /metrics"
            }));
        }
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics_output())
}

pub fn configure<G: PaymentGateway + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics::<G>));
}
