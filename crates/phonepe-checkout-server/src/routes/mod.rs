use actix_web::web;
use checkout::PaymentGateway;

pub mod health;
pub mod pay;
pub mod status;

/// Mount every route. The app must carry `web::Data<AppState<G>>`.
pub fn configure<G: PaymentGateway + 'static>(cfg: &mut web::ServiceConfig) {
    health::configure::<G>(cfg);
    pay::configure::<G>(cfg);
    status::configure(cfg);
}
