use actix_web::{web, HttpResponse};
use checkout::{initiate_payment, parse_amount, PaymentGateway, RedirectResult};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ResponseMode;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// JSON body limit for inbound requests.
pub const JSON_LIMIT: usize = 65_536;

#[derive(Debug, Deserialize)]
pub struct PayBody {
    /// Rupees, as a number or numeric string
    #[serde(default)]
    pub amount: Value,
    /// Payer display name; not forwarded to the gateway, so any JSON type is accepted
    #[serde(default)]
    pub name: Option<Value>,
}

/// JSON extractor config that reports malformed bodies as `400 {"error": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// POST /pay - Initiate a pay-page payment and return the checkout URL
pub async fn pay<G: PaymentGateway + 'static>(
    body: web::Json<PayBody>,
    state: web::Data<AppState<G>>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let amount = parse_amount(&body.amount).inspect_err(|e| {
        metrics::PAYMENTS.with_label_values(&[e.kind()]).inc();
    })?;

    if let Some(Value::String(ref name)) = body.name {
        tracing::debug!(payer_name = %name, "payment requested");
    }

    let timer = metrics::PAYMENT_LATENCY.start_timer();
    let outcome = initiate_payment(state.gateway.as_ref(), &state.merchant, amount).await;
    timer.observe_duration();

    let initiated = outcome.inspect_err(|e| {
        metrics::PAYMENTS.with_label_values(&[e.kind()]).inc();
    })?;
    metrics::PAYMENTS.with_label_values(&["success"]).inc();

    tracing::info!(
        transaction_id = %initiated.transaction_id,
        amount = initiated.amount,
        "payment initiated"
    );

    Ok(HttpResponse::Ok().json(payment_response(
        state.config.response_mode,
        initiated.result,
    )))
}

/// Render a successful initiation in the configured response shape.
pub fn payment_response(mode: ResponseMode, result: RedirectResult) -> Value {
    match mode {
        ResponseMode::Redirect => serde_json::json!({
            "success": true,
            "redirectUrl": result.redirect_url,
        }),
        ResponseMode::Passthrough => match result.body {
            Value::Object(mut map) => {
                map.insert("redirectUrl".to_string(), result.redirect_url.into());
                Value::Object(map)
            }
            other => serde_json::json!({
                "gatewayResponse": other,
                "redirectUrl": result.redirect_url,
            }),
        },
    }
}

/// Configure payment routes
pub fn configure<G: PaymentGateway + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pay").route(web::post().to(pay::<G>)));
}
