// Asset preloading: list the image manifest, then fetch every entry
// concurrently so later lookups hit a warm cache on the backend side.

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::CoreError;

/// Outcome of one preload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
    pub bytes: usize,
}

/// Fetch every asset the backend lists. Only a failed manifest fetch is an
/// error; individual asset failures are counted.
pub async fn preload<B: Backend>(backend: &B) -> Result<PreloadReport, CoreError> {
    let paths = backend.list_images().await?;
    debug!(count = paths.len(), "preloading assets");

    let results = join_all(paths.iter().map(|path| backend.fetch_asset(path))).await;

    let mut report = PreloadReport::default();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(body) => {
                report.loaded += 1;
                report.bytes += body.len();
            }
            Err(e) => {
                warn!(path = %path, error = %e, "asset preload failed");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}
