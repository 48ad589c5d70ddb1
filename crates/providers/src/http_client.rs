//! HTTP Client Factory
//!
//! Builds reqwest clients with the timeouts every remote adapter needs.
//! Per-call wall-clock budgets are enforced by the executor on top of
//! these transport-level limits.

use std::time::Duration;

/// Connect timeout applied to every adapter client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a `reqwest::Client` with a bounded request timeout.
pub fn build_http_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .expect("failed to build reqwest client")
}
