//! Prometheus metrics for the token pipeline.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_issuer_tokens_issued_total",
        "Total number of tokens issued",
        &["token_type", "algorithm"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Client authentication attempts counter.
pub static CLIENT_AUTHENTICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_issuer_client_authentications_total",
        "Total number of client authentication attempts",
        &["method", "status"]
    )
    .expect("Failed to register client_authentications metric")
});

/// Key provisioning counter, by where the key pair came from.
pub static KEYS_PROVISIONED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "token_issuer_keys_provisioned_total",
        "Total number of signing key provisioning operations",
        &["source", "status"]
    )
    .expect("Failed to register keys_provisioned metric")
});

/// Record an issued token.
pub fn record_token_issued(token_type: &str, algorithm: &str) {
    TOKENS_ISSUED.with_label_values(&[token_type, algorithm]).inc();
}

/// Record a client authentication attempt.
pub fn record_client_authentication(method: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    CLIENT_AUTHENTICATIONS.with_label_values(&[method, status]).inc();
}

/// Record a key provisioning attempt.
pub fn record_key_provisioning(source: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    KEYS_PROVISIONED.with_label_values(&[source, status]).inc();
}
