/// Utility functions for time handling and formatting
use time::{format_description, OffsetDateTime};

/// Format a timestamp as wall-clock time for chart labels
///
/// Falls back to default string representation if formatting fails.
pub fn format_clock(dt: &OffsetDateTime) -> String {
    match format_description::parse("[hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Convert a time::Duration to whole seconds as u64
///
/// Floors towards zero; a negative duration (clock stepped backwards) is 0.
pub fn duration_to_seconds(duration: time::Duration) -> u64 {
    duration.whole_seconds().max(0) as u64
}

/// Milliseconds since the Unix epoch
pub fn unix_millis(dt: &OffsetDateTime) -> i128 {
    dt.unix_timestamp_nanos() / 1_000_000
}

/// File name under which a downloaded report is saved
///
/// # Arguments
/// * `at` - Moment the download was requested
///
/// # Returns
/// `temperature-report-<unix-ms>.csv`
pub fn report_filename(at: &OffsetDateTime) -> String {
    format!("temperature-report-{}.csv", unix_millis(at))
}

/// Round to one decimal place, the precision the sensor feed uses
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
