/// Live dashboard state and the reducer that drives it
use time::OffsetDateTime;

use crate::dashboard::window::SampleWindow;
use crate::models::{Sample, SensorUpdate, Snapshot, Trend};
use crate::utils::duration_to_seconds;

/// Temperature above which the alert condition holds
pub const ALERT_THRESHOLD: f64 = 38.0;

/// Input to [`DashboardState::apply`]
///
/// Every stimulus the dashboard reacts to (snapshot, push sample, channel
/// lifecycle, staleness tick, user action) is one of these. Applying an event
/// mutates the state in one step and then re-runs the alert rule, so no reader
/// ever sees a new temperature next to a stale trend or alert.
///
/// ```text
///              temp > 38 && !ack && sound
///   Quiet ───────────────────────────────► Alerting
///     ▲                                      │
///     │ temp <= 38           acknowledge     │
///     ├──────────────── Acknowledged ◄───────┘
///     │                     │
///     └─────────────────────┘ temp <= 38
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Initial pull from the REST endpoint
    Snapshot {
        snapshot: Snapshot,
        at: OffsetDateTime,
    },
    /// Incremental push from the sample source
    Sample {
        update: SensorUpdate,
        at: OffsetDateTime,
    },
    ChannelConnected,
    ChannelDisconnected,
    /// Wall-clock tick driving the staleness counter
    Tick(OffsetDateTime),
    AcknowledgeAlert,
    SoundGranted,
    SoundDenied,
}

/// Change of the alert-active flag caused by one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEdge {
    Raised,
    Cleared,
}

/// Observable outcome of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub alert: Option<AlertEdge>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    temperature: f64,
    prediction: f64,
    battery: f64,
    online: bool,
    trend: Trend,
    last_update: Option<OffsetDateTime>,
    seconds_since_update: Option<u64>,
    alert_active: bool,
    alert_acknowledged: bool,
    sound_enabled: bool,
    window: SampleWindow,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and re-evaluate the alert rule
    ///
    /// # Returns
    /// Transition describing whether the alert flag flipped
    pub fn apply(&mut self, event: DashboardEvent) -> Transition {
        let was_alerting = self.alert_active;

        match event {
            DashboardEvent::Snapshot { snapshot, at } => self.seed(snapshot, at),
            DashboardEvent::Sample { update, at } => self.ingest(update, at),
            DashboardEvent::ChannelConnected => self.online = true,
            DashboardEvent::ChannelDisconnected => self.online = false,
            DashboardEvent::Tick(now) => self.tick(now),
            DashboardEvent::AcknowledgeAlert => {
                self.alert_active = false;
                self.alert_acknowledged = true;
            }
            DashboardEvent::SoundGranted => self.sound_enabled = true,
            DashboardEvent::SoundDenied => self.sound_enabled = false,
        }

        self.evaluate_alert_rule();

        let alert = match (was_alerting, self.alert_active) {
            (false, true) => Some(AlertEdge::Raised),
            (true, false) => Some(AlertEdge::Cleared),
            _ => None,
        };
        Transition { alert }
    }

    fn seed(&mut self, snapshot: Snapshot, at: OffsetDateTime) {
        self.temperature = snapshot.temperature;
        self.prediction = snapshot.prediction;
        self.battery = snapshot.battery;
        self.online = snapshot
            .online
            .unwrap_or(snapshot.temperature != 0.0);
        self.stamp(at);
        self.window.reset_to(Sample {
            timestamp: at,
            temperature: snapshot.temperature,
        });
    }

    fn ingest(&mut self, update: SensorUpdate, at: OffsetDateTime) {
        // Nothing to compare against before the first reading
        self.trend = match self.last_update {
            Some(_) => Trend::between(self.temperature, update.temperature),
            None => Trend::Stable,
        };
        self.temperature = update.temperature;
        if let Some(battery) = update.battery {
            self.battery = battery;
        }
        if let Some(prediction) = update.prediction {
            self.prediction = prediction;
        }
        self.online = true;
        self.stamp(at);
        self.window.push(Sample {
            timestamp: at,
            temperature: update.temperature,
        });
    }

    fn stamp(&mut self, at: OffsetDateTime) {
        self.last_update = Some(at);
        self.seconds_since_update = Some(0);
    }

    fn tick(&mut self, now: OffsetDateTime) {
        if let Some(last) = self.last_update {
            self.seconds_since_update = Some(duration_to_seconds(now - last));
        }
    }

    fn evaluate_alert_rule(&mut self) {
        if self.temperature <= ALERT_THRESHOLD {
            self.alert_active = false;
            self.alert_acknowledged = false;
        } else {
            self.alert_active = !self.alert_acknowledged && self.sound_enabled;
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn prediction(&self) -> f64 {
        self.prediction
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.last_update
    }

    pub fn seconds_since_update(&self) -> Option<u64> {
        self.seconds_since_update
    }

    pub fn is_alert_active(&self) -> bool {
        self.alert_active
    }

    pub fn is_alert_acknowledged(&self) -> bool {
        self.alert_acknowledged
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    const T0: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;

    fn sample(temperature: f64) -> DashboardEvent {
        DashboardEvent::Sample {
            update: SensorUpdate {
                temperature,
                battery: None,
                prediction: None,
            },
            at: T0,
        }
    }

    fn sound_enabled() -> DashboardState {
        let mut state = DashboardState::new();
        state.apply(DashboardEvent::SoundGranted);
        state
    }

    fn assert_alert_invariant(state: &DashboardState) {
        if state.is_alert_active() {
            assert!(state.temperature() > ALERT_THRESHOLD);
            assert!(!state.is_alert_acknowledged());
            assert!(state.is_sound_enabled());
        }
    }

    #[test]
    fn snapshot_seeds_state() {
        let mut state = DashboardState::new();
        let transition = state.apply(DashboardEvent::Snapshot {
            snapshot: Snapshot {
                temperature: 36.0,
                prediction: 39.0,
                battery: 70.0,
                online: None,
            },
            at: T0,
        });

        assert_eq!(transition.alert, None);
        assert_eq!(state.temperature(), 36.0);
        assert_eq!(state.prediction(), 39.0);
        assert_eq!(state.battery(), 70.0);
        assert_eq!(state.trend(), Trend::Stable);
        assert!(state.is_online());
        assert!(!state.is_alert_active());
        assert_eq!(state.window().len(), 1);
        assert_eq!(state.last_update(), Some(T0));
    }

    #[test]
    fn snapshot_prefers_explicit_online_flag() {
        let mut state = DashboardState::new();
        state.apply(DashboardEvent::Snapshot {
            snapshot: Snapshot {
                temperature: 36.0,
                online: Some(false),
                ..Default::default()
            },
            at: T0,
        });
        assert!(!state.is_online());

        state.apply(DashboardEvent::Snapshot {
            snapshot: Snapshot::default(),
            at: T0,
        });
        assert!(!state.is_online());
    }

    #[test]
    fn snapshot_resets_window_to_single_entry() {
        let mut state = DashboardState::new();
        for t in [30.0, 31.0, 32.0] {
            state.apply(sample(t));
        }
        state.apply(DashboardEvent::Snapshot {
            snapshot: Snapshot {
                temperature: 36.0,
                ..Default::default()
            },
            at: T0,
        });
        assert_eq!(state.window().len(), 1);
    }

    #[test]
    fn first_sample_is_stable() {
        let mut state = DashboardState::new();
        state.apply(sample(34.0));
        assert_eq!(state.trend(), Trend::Stable);
    }

    #[test]
    fn trend_follows_consecutive_samples() {
        let mut state = DashboardState::new();
        state.apply(sample(34.0));
        state.apply(sample(34.5));
        assert_eq!(state.trend(), Trend::Rising);

        let mut state = DashboardState::new();
        state.apply(sample(34.0));
        state.apply(sample(34.2));
        assert_eq!(state.trend(), Trend::Stable);
        state.apply(sample(36.0));
        assert_eq!(state.trend(), Trend::Rising);
        state.apply(sample(35.0));
        assert_eq!(state.trend(), Trend::Falling);
    }

    #[test]
    fn sample_updates_all_fields_together() {
        let mut state = DashboardState::new();
        state.apply(DashboardEvent::ChannelDisconnected);
        state.apply(DashboardEvent::Sample {
            update: SensorUpdate {
                temperature: 35.5,
                battery: Some(64.0),
                prediction: Some(37.0),
            },
            at: T0 + Duration::seconds(7),
        });

        assert_eq!(state.temperature(), 35.5);
        assert_eq!(state.battery(), 64.0);
        assert_eq!(state.prediction(), 37.0);
        assert!(state.is_online());
        assert_eq!(state.last_update(), Some(T0 + Duration::seconds(7)));
        assert_eq!(state.seconds_since_update(), Some(0));
        assert_eq!(state.window().latest().map(|s| s.temperature), Some(35.5));
    }

    #[test]
    fn missing_battery_keeps_previous_value() {
        let mut state = DashboardState::new();
        state.apply(DashboardEvent::Sample {
            update: SensorUpdate {
                temperature: 35.0,
                battery: Some(80.0),
                prediction: None,
            },
            at: T0,
        });
        state.apply(sample(35.1));
        assert_eq!(state.battery(), 80.0);
    }

    #[test]
    fn window_is_bounded_under_push_stream() {
        let mut state = DashboardState::new();
        for i in 0..40 {
            state.apply(sample(30.0 + i as f64 * 0.1));
            assert!(state.window().len() <= SampleWindow::CAPACITY);
        }
        assert_eq!(state.window().len(), SampleWindow::CAPACITY);
    }

    #[test]
    fn staleness_counts_whole_seconds() {
        let mut state = DashboardState::new();
        state.apply(sample(35.0));
        state.apply(DashboardEvent::Tick(T0 + Duration::milliseconds(5_400)));
        assert_eq!(state.seconds_since_update(), Some(5));
    }

    #[test]
    fn tick_before_first_sample_is_noop() {
        let mut state = DashboardState::new();
        state.apply(DashboardEvent::Tick(T0 + Duration::seconds(5)));
        assert_eq!(state.seconds_since_update(), None);
        assert_eq!(state.last_update(), None);
    }

    #[test]
    fn disconnect_keeps_readings() {
        let mut state = DashboardState::new();
        state.apply(sample(35.0));
        state.apply(sample(36.0));
        state.apply(DashboardEvent::ChannelDisconnected);

        assert!(!state.is_online());
        assert_eq!(state.temperature(), 36.0);
        assert_eq!(state.window().len(), 2);

        state.apply(DashboardEvent::ChannelConnected);
        assert!(state.is_online());
    }

    #[test]
    fn alert_requires_sound_permission() {
        let mut state = DashboardState::new();
        let transition = state.apply(sample(39.0));
        assert_eq!(transition.alert, None);
        assert!(!state.is_alert_active());

        let transition = state.apply(DashboardEvent::SoundGranted);
        assert_eq!(transition.alert, Some(AlertEdge::Raised));
        assert!(state.is_alert_active());
    }

    #[test]
    fn denying_sound_clears_active_alert() {
        let mut state = sound_enabled();
        state.apply(sample(39.0));
        let transition = state.apply(DashboardEvent::SoundDenied);
        assert_eq!(transition.alert, Some(AlertEdge::Cleared));
        assert_alert_invariant(&state);
    }

    #[test]
    fn threshold_itself_does_not_alert() {
        let mut state = sound_enabled();
        state.apply(sample(38.0));
        assert!(!state.is_alert_active());
    }

    #[test]
    fn acknowledged_alert_stays_silent_until_episode_ends() {
        let mut state = sound_enabled();

        let transition = state.apply(sample(39.0));
        assert_eq!(transition.alert, Some(AlertEdge::Raised));

        let transition = state.apply(DashboardEvent::AcknowledgeAlert);
        assert_eq!(transition.alert, Some(AlertEdge::Cleared));
        assert!(!state.is_alert_active());
        assert!(state.is_alert_acknowledged());

        state.apply(sample(39.5));
        assert!(!state.is_alert_active());
        assert!(state.is_alert_acknowledged());

        state.apply(sample(37.0));
        assert!(!state.is_alert_acknowledged());

        let transition = state.apply(sample(39.0));
        assert_eq!(transition.alert, Some(AlertEdge::Raised));
        assert!(state.is_alert_active());
    }

    #[test]
    fn dropping_to_threshold_clears_both_flags() {
        let mut state = sound_enabled();
        state.apply(sample(39.0));
        state.apply(DashboardEvent::AcknowledgeAlert);
        state.apply(sample(38.0));
        assert!(!state.is_alert_active());
        assert!(!state.is_alert_acknowledged());

        state.apply(sample(40.0));
        let transition = state.apply(sample(38.0));
        assert_eq!(transition.alert, Some(AlertEdge::Cleared));
        assert!(!state.is_alert_active());
        assert!(!state.is_alert_acknowledged());
    }

    #[test]
    fn acknowledging_below_threshold_is_cleared_immediately() {
        let mut state = sound_enabled();
        state.apply(sample(36.0));
        state.apply(DashboardEvent::AcknowledgeAlert);
        assert!(!state.is_alert_acknowledged());
    }

    #[test]
    fn invariant_holds_over_mixed_event_stream() {
        let mut state = DashboardState::new();
        let temps = [36.0, 38.5, 39.2, 38.0, 40.1, 41.0, 37.9, 38.1, 39.9];
        for (i, t) in temps.iter().enumerate() {
            state.apply(sample(*t));
            assert_alert_invariant(&state);
            let extra = match i % 4 {
                0 => DashboardEvent::SoundGranted,
                1 => DashboardEvent::AcknowledgeAlert,
                2 => DashboardEvent::ChannelDisconnected,
                _ => DashboardEvent::SoundDenied,
            };
            state.apply(extra);
            assert_alert_invariant(&state);
        }
    }
}
