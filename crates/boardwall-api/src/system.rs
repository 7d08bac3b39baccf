// System endpoints
//
// Host information, CPU telemetry, and the static asset manifest.

use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::types::{CpuResponse, SystemInfoResponse};

impl BackendClient {
    /// Host facts used to seed the initial layout.
    ///
    /// `GET /get_system_info`
    pub async fn system_info(&self) -> Result<SystemInfoResponse, Error> {
        debug!("fetching system info");
        self.get("get_system_info").await
    }

    /// Per-core CPU utilization in percent.
    ///
    /// `GET /cpu`
    pub async fn cpu_usage(&self) -> Result<Vec<f64>, Error> {
        let resp: CpuResponse = self.get("cpu").await?;
        Ok(resp.cpu)
    }

    /// Paths of every image asset the dashboard may display.
    ///
    /// `GET /get_images`
    pub async fn list_images(&self) -> Result<Vec<String>, Error> {
        self.get("get_images").await
    }

    /// Fetch one asset by the path returned from [`list_images`](Self::list_images).
    pub async fn fetch_asset(&self, path: &str) -> Result<bytes::Bytes, Error> {
        self.get_bytes(path).await
    }
}
