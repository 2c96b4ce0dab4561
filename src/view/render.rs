/// Text rendering of the dashboard panels
use std::fmt::Write;

use crate::dashboard::{DashboardState, ALERT_THRESHOLD};
use crate::models::Trend;
use crate::utils::format_clock;
use crate::view::classify::{
    chart_level, footer_battery, forecast_risk, gauge_fraction, header_battery,
    temperature_status, GAUGE_MAX, GAUGE_MIN, RESET,
};
use crate::view::forecast::ForecastBand;

const GAUGE_WIDTH: usize = 30;
const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Everything the panels need, detached from the live state
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub device_name: String,
    pub mode: &'static str,
    pub online: bool,
    pub battery: f64,
    pub temperature: f64,
    pub trend: Trend,
    pub prediction: f64,
    pub history: Vec<(String, f64)>,
    pub seconds_since_update: Option<u64>,
    pub alert_active: bool,
    pub sound_prompt: bool,
    pub advisory: Option<String>,
    /// Most recent notable event, shown because the redraw wipes log lines
    pub status: Option<String>,
}

impl DashboardView {
    pub fn from_state(
        state: &DashboardState,
        device_name: &str,
        mode: &'static str,
        sound_prompt: bool,
        advisory: Option<String>,
    ) -> Self {
        Self {
            device_name: device_name.to_string(),
            mode,
            online: state.is_online(),
            battery: state.battery(),
            temperature: state.temperature(),
            trend: state.trend(),
            prediction: state.prediction(),
            history: state
                .window()
                .iter()
                .map(|s| (format_clock(&s.timestamp), s.temperature))
                .collect(),
            seconds_since_update: state.seconds_since_update(),
            alert_active: state.is_alert_active(),
            sound_prompt,
            advisory,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    pub fn last_update_label(&self) -> String {
        match self.seconds_since_update {
            Some(secs) => format!("{}s ago", secs),
            None => "--".to_string(),
        }
    }
}

/// Render the whole screen, top to bottom
pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    render_header(&mut out, view);
    render_current(&mut out, view);
    render_forecast(&mut out, view);
    render_chart(&mut out, view);
    render_footer(&mut out, view);
    if view.alert_active {
        render_alert(&mut out, view);
    }
    if view.sound_prompt {
        render_sound_prompt(&mut out);
    }
    if let Some(advisory) = &view.advisory {
        let _ = writeln!(out, "\n  ! {}", advisory);
    }
    if let Some(status) = &view.status {
        let _ = writeln!(out, "\n  Last event: {}", status);
    }
    let _ = writeln!(
        out,
        "\n  [a] stop alarm  [d] download report  [y/n] sound  [q] quit"
    );
    out
}

fn render_header(out: &mut String, view: &DashboardView) {
    let (dot, status) = if view.online {
        ("\x1B[32m●", "online")
    } else {
        ("\x1B[31m●", "offline")
    };
    let _ = writeln!(
        out,
        "=== {} ===   {}{} {}   {}battery {:.0}%{}",
        view.device_name,
        dot,
        RESET,
        status,
        header_battery(view.battery).ansi(),
        view.battery,
        RESET
    );
    if !view.online {
        let _ = writeln!(out, "  (report download disabled while offline)");
    }
}

fn render_current(out: &mut String, view: &DashboardView) {
    let (level, label) = temperature_status(view.temperature);
    let filled = (gauge_fraction(view.temperature) * GAUGE_WIDTH as f64).round() as usize;

    let _ = writeln!(out, "\nCurrent Temperature");
    let _ = writeln!(
        out,
        "  {:.0}° [{}{}{}{}] {:.0}°",
        GAUGE_MIN,
        level.ansi(),
        "#".repeat(filled),
        RESET,
        "-".repeat(GAUGE_WIDTH - filled),
        GAUGE_MAX
    );
    let _ = writeln!(
        out,
        "  {}{:.1} °C  {}{}   {} {}",
        level.ansi(),
        view.temperature,
        label,
        RESET,
        view.trend.arrow(),
        view.trend.label()
    );
    if view.temperature > ALERT_THRESHOLD {
        let _ = writeln!(out, "  \x1B[31m!! Temperature Alert Active{}", RESET);
    }
}

fn render_forecast(out: &mut String, view: &DashboardView) {
    let band = ForecastBand::new(view.prediction);
    let (level, label) = forecast_risk(view.prediction);
    let (start, end) = (band.start(), band.end());

    let _ = writeln!(
        out,
        "\nTemperature Prediction (next {} minutes)",
        band.horizon_minutes
    );
    let _ = writeln!(
        out,
        "  {}{:.1}°{} expected   {}{}{}",
        level.ansi(),
        view.prediction,
        RESET,
        level.ansi(),
        label,
        RESET
    );
    let _ = writeln!(
        out,
        "  now  {:.1} ({:.1}..{:.1})  ->  +{}m  {:.1} ({:.1}..{:.1})",
        start.mean, start.lower, start.upper, end.minute, end.mean, end.lower, end.upper
    );
}

fn render_chart(out: &mut String, view: &DashboardView) {
    let _ = writeln!(out, "\nLive Temperature");
    if view.history.is_empty() {
        let _ = writeln!(out, "  waiting for data");
        return;
    }

    let _ = writeln!(out, "  {}", sparkline(&view.history));
    if let (Some(first), Some(last)) = (view.history.first(), view.history.last()) {
        let _ = writeln!(out, "  {} .. {}", first.0, last.0);
    }
}

/// One bar per sample, scaled between min - 1 and max + 1 of the window
pub fn sparkline(history: &[(String, f64)]) -> String {
    let latest = match history.last() {
        Some((_, t)) => *t,
        None => return String::new(),
    };

    let min = history.iter().map(|(_, t)| *t).fold(f64::INFINITY, f64::min) - 1.0;
    let max = history
        .iter()
        .map(|(_, t)| *t)
        .fold(f64::NEG_INFINITY, f64::max)
        + 1.0;

    let bars: String = history
        .iter()
        .map(|(_, t)| {
            let ratio = (t - min) / (max - min);
            let idx = (ratio * (SPARK.len() - 1) as f64).round() as usize;
            SPARK[idx.min(SPARK.len() - 1)]
        })
        .collect();

    format!("{}{}{}", chart_level(latest).ansi(), bars, RESET)
}

fn render_footer(out: &mut String, view: &DashboardView) {
    let _ = writeln!(
        out,
        "\nDevice {}   Battery {}{:.0}%{}   Last update {}   Mode {}",
        if view.online { "Online" } else { "Offline" },
        footer_battery(view.battery).ansi(),
        view.battery,
        RESET,
        view.last_update_label(),
        view.mode
    );
}

fn render_alert(out: &mut String, view: &DashboardView) {
    let _ = writeln!(out, "\n\x1B[31m+------------------------------------------+");
    let _ = writeln!(out, "|            TEMPERATURE ALERT             |");
    let _ = writeln!(out, "|  Temperature has exceeded the safe limit |");
    let _ = writeln!(out, "|                 {:>5.1}°C                 |", view.temperature);
    let _ = writeln!(out, "|        press [a] to stop the alarm       |");
    let _ = writeln!(out, "+------------------------------------------+{}", RESET);
}

fn render_sound_prompt(out: &mut String) {
    let _ = writeln!(out, "\nEnable Alert Sound?");
    let _ = writeln!(
        out,
        "  An audible alarm plays when the temperature exceeds {:.0}°C.",
        ALERT_THRESHOLD
    );
    let _ = writeln!(out, "  [y] Allow Sound   [n] No Thanks");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardEvent;
    use crate::models::SensorUpdate;
    use time::OffsetDateTime;

    fn state_with(temps: &[f64]) -> DashboardState {
        let mut state = DashboardState::new();
        for t in temps {
            state.apply(DashboardEvent::Sample {
                update: SensorUpdate {
                    temperature: *t,
                    battery: Some(78.0),
                    prediction: Some(39.0),
                },
                at: OffsetDateTime::UNIX_EPOCH,
            });
        }
        state
    }

    #[test]
    fn view_copies_state() {
        let state = state_with(&[35.0, 36.0]);
        let view = DashboardView::from_state(&state, "TempGuard-01", "Live", false, None);
        assert_eq!(view.temperature, 36.0);
        assert_eq!(view.trend, Trend::Rising);
        assert_eq!(view.history.len(), 2);
        assert_eq!(view.last_update_label(), "0s ago");
    }

    #[test]
    fn banner_shows_without_sound_permission() {
        let state = state_with(&[39.0]);
        let view = DashboardView::from_state(&state, "TempGuard-01", "Live", true, None);
        assert!(!view.alert_active);

        let screen = render(&view);
        assert!(screen.contains("Temperature Alert Active"));
        assert!(screen.contains("Enable Alert Sound?"));
        assert!(!screen.contains("TEMPERATURE ALERT"));
    }

    #[test]
    fn dialog_shows_while_alert_active() {
        let mut state = state_with(&[]);
        state.apply(DashboardEvent::SoundGranted);
        state.apply(DashboardEvent::Sample {
            update: SensorUpdate {
                temperature: 39.4,
                battery: None,
                prediction: None,
            },
            at: OffsetDateTime::UNIX_EPOCH,
        });
        let view = DashboardView::from_state(&state, "TempGuard-01", "Live", false, None);
        let screen = render(&view);
        assert!(screen.contains("TEMPERATURE ALERT"));
        assert!(screen.contains("39.4°C"));
    }

    #[test]
    fn empty_chart_waits_for_data() {
        let view = DashboardView::from_state(&DashboardState::new(), "X", "Simulated", false, None);
        assert_eq!(view.last_update_label(), "--");
        assert!(render(&view).contains("waiting for data"));
        assert!(render(&view).contains("offline"));
    }

    #[test]
    fn status_line_is_rendered() {
        let view = DashboardView::from_state(&DashboardState::new(), "X", "Live", false, None);
        assert!(!render(&view).contains("Last event"));

        let view = view.with_status(Some("12:00:00 sample source disconnected".to_string()));
        assert!(render(&view).contains("Last event: 12:00:00 sample source disconnected"));
    }

    #[test]
    fn sparkline_has_one_bar_per_sample() {
        let history: Vec<(String, f64)> = [34.0, 35.0, 36.0]
            .iter()
            .map(|t| (String::new(), *t))
            .collect();
        let line = sparkline(&history);
        assert_eq!(line.chars().filter(|c| SPARK.contains(c)).count(), 3);
    }
}
