use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout::PhonePeClient;
use checkout_server::{config::CheckoutConfig, cors::build_cors, routes, state::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CheckoutConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting phonepe-checkout-server on port {}", port);
    tracing::info!("Using PHONEPE_HOST: {}", config.phonepe_host);
    tracing::info!("Merchant: {}", config.merchant_id);
    tracing::info!("Response mode: {:?}", config.response_mode);
    tracing::info!("Gateway timeout: {:?}", config.gateway_timeout);

    let state = match AppState::from_config(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create gateway client: {e}");
            std::process::exit(1);
        }
    };
    let state_data = web::Data::new(state);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .ok_or_else(|| std::io::Error::other("invalid rate limiter config"))?;

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .app_data(routes::pay::json_config())
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure::<PhonePeClient>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
