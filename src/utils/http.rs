use reqwest::Client;
use std::time::Duration;

fn base_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
}

/// Pooled client with no overall request timeout. Reasoning backends use it
/// because the agent bounds each generation itself.
pub fn build_http_client() -> Client {
    base_builder().build().unwrap_or_else(|_| Client::new())
}

/// Pooled client whose requests give up after `timeout`.
pub fn build_http_client_with_timeout(timeout: Duration) -> Client {
    base_builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}
