// Startup health check
//
// The backend is usually launched alongside the dashboard and needs a few
// seconds before it answers. Poll the root until it returns 200.

use std::time::Duration;

use tracing::{debug, info};

use crate::client::BackendClient;
use crate::error::Error;

impl BackendClient {
    /// Block until `GET /` answers HTTP 200.
    ///
    /// Makes at most `max_attempts` requests, sleeping `backoff` between
    /// them. Connection errors and non-200 statuses both count as a failed
    /// attempt.
    pub async fn wait_until_ready(&self, max_attempts: u32, backoff: Duration) -> Result<(), Error> {
        for attempt in 1..=max_attempts {
            match self.status_of("").await {
                Ok(status) if status == reqwest::StatusCode::OK => {
                    info!(attempt, "backend is ready");
                    return Ok(());
                }
                Ok(status) => debug!(attempt, %status, "backend not ready yet"),
                Err(e) => debug!(attempt, error = %e, "backend not reachable yet"),
            }

            if attempt < max_attempts {
                tokio::time::sleep(backoff).await;
            }
        }

        Err(Error::BackendUnavailable {
            attempts: max_attempts,
        })
    }
}
