// Shared transport configuration for building reqwest::Client instances.
//
// Every backend call goes through one client; timeout and user agent are
// decided here so the endpoint modules never touch the builder.

use std::time::Duration;

const USER_AGENT: &str = concat!("boardwall/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Poll ticks that exceed it are skipped.
    pub timeout: Duration,
    /// Idle connections kept per host. One per board plus the telemetry
    /// poller is plenty.
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 32,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
