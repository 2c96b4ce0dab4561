/// REST client for the dashboard backend
use log::debug;
use url::Url;

use crate::error::FetchError;
use crate::models::Snapshot;

const DASHBOARD_PATH: &str = "api/dashboard";
const REPORT_PATH: &str = "api/dashboard/download-report";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    /// Create a client rooted at `base`
    ///
    /// A trailing slash is added when missing so endpoint paths are appended
    /// rather than replacing the last segment.
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: with_trailing_slash(base),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(path)?)
    }

    /// Fetch the initial dashboard snapshot
    ///
    /// # Returns
    /// Decoded snapshot, or the transport/status/decode failure
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let url = self.endpoint(DASHBOARD_PATH)?;
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.json::<Snapshot>().await?)
    }

    /// Fetch the CSV report as raw bytes
    pub async fn fetch_report(&self) -> Result<Vec<u8>, FetchError> {
        let url = self.endpoint(REPORT_PATH)?;
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
