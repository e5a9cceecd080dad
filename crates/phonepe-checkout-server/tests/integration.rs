use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::dev::Service;
use actix_web::{test, web, App};
use base64::Engine;
use checkout::{
    checksum, CheckoutError, EncodedPayload, PaymentGateway, PaymentRequest, RedirectResult,
    PAY_API_PATH,
};

use checkout_server::config::{CheckoutConfig, ResponseMode};
use checkout_server::routes;
use checkout_server::state::AppState;

const SALT_KEY: &str = "099eb0cd-02cf-4e2a-8aca-3e6c6aff0399";

/// How the stub gateway answers every call.
enum Reply {
    Json(serde_json::Value),
    Reject(u16, &'static str),
    Unreachable,
}

/// Gateway double that counts calls and keeps the last signed payload.
struct StubGateway {
    reply: Reply,
    calls: AtomicUsize,
    last: Mutex<Option<(EncodedPayload, String)>>,
}

impl StubGateway {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn redirecting_to(url: &str) -> Self {
        Self::new(Reply::Json(serde_json::json!({
            "success": true,
            "code": "PAYMENT_INITIATED",
            "message": "Payment initiated",
            "data": {
                "merchantId": "PGTESTPAYUAT",
                "instrumentResponse": {
                    "type": "PAY_PAGE",
                    "redirectInfo": {"url": url, "method": "GET"}
                }
            }
        })))
    }
}

impl PaymentGateway for StubGateway {
    async fn submit_payment(
        &self,
        payload: &EncodedPayload,
        checksum: &str,
    ) -> Result<RedirectResult, CheckoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((payload.clone(), checksum.to_string()));
        match &self.reply {
            Reply::Json(body) => Ok(RedirectResult::from_body(body.clone())),
            Reply::Reject(status, message) => Err(CheckoutError::Gateway {
                status: *status,
                message: message.to_string(),
            }),
            Reply::Unreachable => Err(CheckoutError::Transport(
                "error sending request: connection refused".to_string(),
            )),
        }
    }
}

fn config(mode: ResponseMode, metrics_token: Option<&str>) -> CheckoutConfig {
    CheckoutConfig {
        merchant_id: "PGTESTPAYUAT".to_string(),
        salt_key: SALT_KEY.to_string(),
        salt_index: "1".to_string(),
        phonepe_host: "https://api-preprod.phonepe.com/apis/pg-sandbox".to_string(),
        public_base_url: "https://relay.example.com".to_string(),
        port: 3001,
        gateway_timeout: Duration::from_secs(30),
        response_mode: mode,
        allowed_origins: vec!["*".to_string()],
        rate_limit_rpm: 600,
        metrics_token: metrics_token.map(str::to_owned),
    }
}

fn make_state(gateway: StubGateway, mode: ResponseMode) -> web::Data<AppState<StubGateway>> {
    web::Data::new(AppState::new(config(mode, None), gateway))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(routes::pay::json_config())
                .configure(routes::configure::<StubGateway>),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_pay_returns_gateway_redirect_url() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"success": true, "redirectUrl": "https://pay.example/abc"})
    );
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_pay_signs_the_exact_payload_it_sends() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": "49.99", "name": "Asha"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let (payload, x_verify) = state.gateway.last.lock().unwrap().clone().unwrap();
    assert!(checksum::verify(
        &x_verify,
        payload.as_str(),
        PAY_API_PATH,
        SALT_KEY,
        "1"
    ));

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload.as_str())
        .unwrap();
    assert_eq!(decoded, payload.json());

    let sent: PaymentRequest = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(sent.amount, 4_999);
    assert_eq!(sent.merchant_id, "PGTESTPAYUAT");
    assert_eq!(sent.redirect_mode, "POST");
    assert_eq!(
        sent.redirect_url,
        format!(
            "https://relay.example.com/status/{}",
            sent.merchant_transaction_id
        )
    );
    assert!(!String::from_utf8(decoded).unwrap().contains("Asha"));
}

#[actix_rt::test]
async fn test_negative_amount_is_rejected_without_gateway_call() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": -5}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"error": "Invalid amount. Must be a positive number."})
    );
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_invalid_amounts_never_reach_gateway() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    for body in [
        serde_json::json!({"amount": 0}),
        serde_json::json!({"amount": "abc"}),
        serde_json::json!({"amount": ""}),
        serde_json::json!({"amount": null}),
        serde_json::json!({"name": "no amount"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/pay")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body {body} should be rejected");
    }
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_non_string_name_does_not_block_payment() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    for body in [
        serde_json::json!({"amount": 100, "name": 42}),
        serde_json::json!({"amount": 100, "name": {"first": "A"}}),
        serde_json::json!({"amount": 100, "name": null}),
    ] {
        let req = test::TestRequest::post()
            .uri("/pay")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "body {body} should be accepted");
    }
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 3);
}

#[actix_rt::test]
async fn test_malformed_json_is_a_bad_request() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"amount\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_gateway_rejection_mirrors_status_and_message() {
    let state = make_state(
        StubGateway::new(Reply::Reject(402, "insufficient merchant balance")),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 402);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"error": "insufficient merchant balance"})
    );
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_gateway_redirect_status_is_not_mirrored() {
    let state = make_state(
        StubGateway::new(Reply::Reject(304, "PhonePe API error")),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({"error": "PhonePe API error"}));
}

#[actix_rt::test]
async fn test_transport_failure_is_500_with_message() {
    let state = make_state(StubGateway::new(Reply::Unreachable), ResponseMode::Redirect);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_missing_redirect_url_is_surfaced_as_null() {
    let state = make_state(
        StubGateway::new(Reply::Json(serde_json::json!({"success": true, "data": {}}))),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body.as_object().unwrap().contains_key("redirectUrl"));
    assert!(body["redirectUrl"].is_null());
}

#[actix_rt::test]
async fn test_passthrough_mode_returns_gateway_body() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Passthrough,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/pay")
        .set_json(serde_json::json!({"amount": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "PAYMENT_INITIATED");
    assert_eq!(body["redirectUrl"], "https://pay.example/abc");
    assert_eq!(
        body["data"]["instrumentResponse"]["redirectInfo"]["url"],
        "https://pay.example/abc"
    );
}

#[actix_rt::test]
async fn test_status_callback_acknowledges_transaction_id() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post().uri("/status/TID-123").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(body.contains("TID-123"));
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn test_status_callback_rejects_markup_in_id() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/status/%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    let body = std::str::from_utf8(&body).unwrap();
    assert!(!body.contains("<script>"));
}

#[actix_rt::test]
async fn test_root_and_health() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("running"));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "phonepe-checkout-server");
}

#[actix_rt::test]
async fn test_metrics_requires_token_when_configured() {
    let state = web::Data::new(AppState::new(
        config(ResponseMode::Redirect, Some("metrics-secret")),
        StubGateway::redirecting_to("https://pay.example/abc"),
    ));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer metrics-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn test_rate_limiter_rejects_burst_from_one_peer() {
    let state = make_state(
        StubGateway::redirecting_to("https://pay.example/abc"),
        ResponseMode::Redirect,
    );
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(1)
        .burst_size(1)
        .finish()
        .unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(routes::pay::json_config())
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure::<StubGateway>),
    )
    .await;

    let peer = "127.0.0.1:40000".parse().unwrap();
    let first = test::TestRequest::get().uri("/").peer_addr(peer).to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 200);

    let second = test::TestRequest::post()
        .uri("/pay")
        .peer_addr(peer)
        .set_json(serde_json::json!({"amount": 100}))
        .to_request();
    // The limiter may answer with an error rather than a response
    let status = match app.call(second).await {
        Ok(resp) => resp.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, 429);
    assert_eq!(state.gateway.calls.load(Ordering::SeqCst), 0);
}
