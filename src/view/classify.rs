/// Colour bucket shared by all dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Good,
    Caution,
    Critical,
}

impl Level {
    /// ANSI foreground colour
    pub fn ansi(&self) -> &'static str {
        match self {
            Level::Good => "\x1B[32m",
            Level::Caution => "\x1B[33m",
            Level::Critical => "\x1B[31m",
        }
    }
}

pub const RESET: &str = "\x1B[0m";

pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 50.0;

/// Status of the current reading: Normal below 35, Warning below 38
pub fn temperature_status(temperature: f64) -> (Level, &'static str) {
    if temperature < 35.0 {
        (Level::Good, "Normal")
    } else if temperature < 38.0 {
        (Level::Caution, "Warning")
    } else {
        (Level::Critical, "Critical")
    }
}

/// Risk of the predicted value: SAFE below 35, WARNING below 40
pub fn forecast_risk(predicted: f64) -> (Level, &'static str) {
    if predicted < 35.0 {
        (Level::Good, "SAFE")
    } else if predicted < 40.0 {
        (Level::Caution, "WARNING")
    } else {
        (Level::Critical, "CRITICAL")
    }
}

/// Chart stroke colour from the latest reading
pub fn chart_level(latest: f64) -> Level {
    if latest < 35.0 {
        Level::Good
    } else if latest < 40.0 {
        Level::Caution
    } else {
        Level::Critical
    }
}

pub fn header_battery(battery: f64) -> Level {
    if battery > 50.0 {
        Level::Good
    } else if battery > 20.0 {
        Level::Caution
    } else {
        Level::Critical
    }
}

pub fn footer_battery(battery: f64) -> Level {
    if battery > 40.0 {
        Level::Good
    } else if battery > 20.0 {
        Level::Caution
    } else {
        Level::Critical
    }
}

/// Share of the gauge filled by `temperature`, clamped to the gauge range
pub fn gauge_fraction(temperature: f64) -> f64 {
    let value = temperature.clamp(GAUGE_MIN, GAUGE_MAX);
    (value - GAUGE_MIN) / (GAUGE_MAX - GAUGE_MIN)
}
