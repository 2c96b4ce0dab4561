use std::env;
use std::path::PathBuf;

use tokio::time::Duration;
use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_DEVICE_NAME: &str = "TempGuard-01";
const DEFAULT_PUSH_EVENT: &str = "sensor:update";
const DEFAULT_SYNTHETIC_INTERVAL_SECS: u64 = 3;
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Where samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Synthetic,
}

impl SourceKind {
    /// Mode label shown in the footer
    pub fn mode_label(&self) -> &'static str {
        match self {
            SourceKind::Live => "Live",
            SourceKind::Synthetic => "Simulated",
        }
    }
}

/// Answer to the sound permission prompt, if given up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundPreference {
    Ask,
    Allow,
    Deny,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub backend_url: Url,
    pub device_name: String,
    pub source: SourceKind,
    pub push_event: String,
    pub synthetic_interval: Duration,
    pub reconnect_delay: Duration,
    pub report_dir: PathBuf,
    pub sound: SoundPreference,
}

impl DashboardConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value lookup
    ///
    /// Unset or blank keys fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend_url = get("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = Url::parse(&backend_url)
            .map_err(|e| format!("Invalid BACKEND_URL '{}': {}", backend_url, e))?;
        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(format!("BACKEND_URL must be http or https, got '{}'", backend_url).into());
        }

        let source = match get("SAMPLE_SOURCE").as_deref() {
            None | Some("live") => SourceKind::Live,
            Some("synthetic") => SourceKind::Synthetic,
            Some(other) => {
                return Err(format!(
                    "SAMPLE_SOURCE must be 'live' or 'synthetic', got '{}'",
                    other
                )
                .into())
            }
        };

        let sound = match get("ALERT_SOUND").as_deref() {
            None | Some("ask") => SoundPreference::Ask,
            Some("allow") => SoundPreference::Allow,
            Some("deny") => SoundPreference::Deny,
            Some(other) => {
                return Err(format!(
                    "ALERT_SOUND must be 'allow', 'deny' or 'ask', got '{}'",
                    other
                )
                .into())
            }
        };

        let seconds = |key: &str, default: u64| -> Result<Duration, Box<dyn std::error::Error>> {
            let secs = match get(key) {
                Some(value) => value
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid {} '{}': {}", key, value, e))?,
                None => default,
            };
            if secs == 0 {
                return Err(format!("{} must be at least 1 second", key).into());
            }
            Ok(Duration::from_secs(secs))
        };

        Ok(DashboardConfig {
            backend_url,
            device_name: get("DEVICE_NAME").unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string()),
            source,
            push_event: get("PUSH_EVENT").unwrap_or_else(|| DEFAULT_PUSH_EVENT.to_string()),
            synthetic_interval: seconds("SYNTHETIC_INTERVAL_SECS", DEFAULT_SYNTHETIC_INTERVAL_SECS)?,
            reconnect_delay: seconds("RECONNECT_DELAY_SECS", DEFAULT_RECONNECT_DELAY_SECS)?,
            report_dir: PathBuf::from(get("REPORT_DIR").unwrap_or_else(|| ".".to_string())),
            sound,
        })
    }
}
