use serde::Deserialize;
use time::OffsetDateTime;

/// One timestamped temperature observation kept in the chart window
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: OffsetDateTime,
    pub temperature: f64,
}

/// Initial dashboard snapshot returned by `GET /api/dashboard`
///
/// Every field is optional on the wire; missing numbers default to zero and a
/// missing `online` flag leaves connectivity to be derived from temperature.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default, rename = "tempprediction")]
    pub prediction: f64,
    #[serde(default)]
    pub battery: f64,
    #[serde(default)]
    pub online: Option<bool>,
}

/// Payload of a push-channel sensor event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorUpdate {
    pub temperature: f64,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default, rename = "tempprediction")]
    pub prediction: Option<f64>,
}

/// Direction of change between two consecutive temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl Trend {
    /// Temperature deltas within this band count as stable
    pub const DEAD_ZONE: f64 = 0.2;

    // Decimal readings like 34.2 - 34.0 land a hair above 0.2 in binary
    const TOLERANCE: f64 = 1e-9;

    pub fn between(previous: f64, next: f64) -> Self {
        let delta = next - previous;
        if delta > Self::DEAD_ZONE + Self::TOLERANCE {
            Trend::Rising
        } else if -delta > Self::DEAD_ZONE + Self::TOLERANCE {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Rising => "Rising",
            Trend::Stable => "Stable",
            Trend::Falling => "Falling",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Stable => "→",
            Trend::Falling => "↓",
        }
    }
}
