/// CSV report download from the backend, saved to the local report directory
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::backend::BackendClient;
use crate::error::FetchError;
use crate::utils::report_filename;

/// Minimum spacing between accepted download requests
pub const DOWNLOAD_COOLDOWN: Duration = Duration::from_millis(1200);

pub struct ReportExporter {
    client: BackendClient,
    dir: PathBuf,
    last_request: Option<Instant>,
}

impl ReportExporter {
    pub fn new(client: BackendClient, dir: PathBuf) -> Self {
        Self {
            client,
            dir,
            last_request: None,
        }
    }

    /// Decide whether a download may start now
    ///
    /// Refuses while offline and within the cooldown after the previous
    /// accepted request, whether or not that request has finished.
    pub fn try_begin(&mut self, online: bool) -> bool {
        if !online {
            warn!("Report download unavailable while offline");
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_request {
            if now.duration_since(last) < DOWNLOAD_COOLDOWN {
                return false;
            }
        }
        self.last_request = Some(now);
        true
    }

    /// Start a background download if allowed
    ///
    /// # Returns
    /// Handle of the spawned download, or None when the request was refused
    pub fn download_report(&mut self, online: bool) -> Option<JoinHandle<()>> {
        if !self.try_begin(online) {
            return None;
        }

        let client = self.client.clone();
        let dir = self.dir.clone();
        Some(tokio::spawn(async move {
            let requested_at = OffsetDateTime::now_utc();
            let result = match client.fetch_report().await {
                Ok(bytes) => save_report(&dir, &bytes, &requested_at).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(path) => info!("Report saved to {}", path.display()),
                Err(e) => error!("Report download failed: {}", e),
            }
        }))
    }
}

/// Write report bytes to `dir` under the timestamped report file name
pub async fn save_report(
    dir: &Path,
    bytes: &[u8],
    requested_at: &OffsetDateTime,
) -> Result<PathBuf, FetchError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_filename(requested_at));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
