use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::LazyLock;

pub static PAYMENTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "checkout_payments_total",
        "Payment initiations by result",
        &["result"]
    )
    .unwrap()
});

pub static PAYMENT_LATENCY: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "checkout_payment_latency_seconds",
        "Time to initiate a payment with the gateway",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap()
});

pub static STATUS_CALLBACKS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "checkout_status_callbacks_total",
        "Post-payment redirects received on /status"
    )
    .unwrap()
});

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
