/// Dashboard runtime: owns the state and routes every stimulus through it
use std::io::Write;

use log::{info, warn};
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::alarm::AlarmController;
use crate::config::{DashboardConfig, SoundPreference};
use crate::dashboard::{AlertEdge, DashboardEvent, DashboardState};
use crate::input::Command;
use crate::models::Snapshot;
use crate::report::ReportExporter;
use crate::source::{SampleSource, SourceEvent};
use crate::utils::format_clock;
use crate::view::{render, DashboardView};

const SOURCE_BUFFER: usize = 64;
const STALENESS_TICK: Duration = Duration::from_secs(1);

const SOUND_FAILED_ADVISORY: &str = "Unable to enable sound. Alerts will be visual only.";
const SOUND_DECLINED_ADVISORY: &str = "Sound alerts disabled. You'll still see visual alerts.";

pub struct Dashboard {
    state: DashboardState,
    alarm: AlarmController,
    exporter: ReportExporter,
    device_name: String,
    mode: &'static str,
    sound_prompt: bool,
    advisory: Option<String>,
    status: Option<String>,
    downloads: Vec<JoinHandle<()>>,
    screen: Box<dyn Write + Send>,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig, alarm: AlarmController, exporter: ReportExporter) -> Self {
        let mut dashboard = Self {
            state: DashboardState::new(),
            alarm,
            exporter,
            device_name: config.device_name.clone(),
            mode: config.source.mode_label(),
            sound_prompt: false,
            advisory: None,
            status: None,
            downloads: Vec::new(),
            screen: Box::new(std::io::stdout()),
        };

        match config.sound {
            SoundPreference::Ask => dashboard.sound_prompt = true,
            SoundPreference::Allow => dashboard.handle_command(Command::AllowSound),
            SoundPreference::Deny => dashboard.handle_command(Command::DenySound),
        }
        dashboard
    }

    /// Apply an event and drive the alarm from the alert edge it produced
    pub fn apply(&mut self, event: DashboardEvent) {
        match self.state.apply(event).alert {
            Some(AlertEdge::Raised) => {
                warn!(
                    "Temperature alert: {:.1}°C above threshold",
                    self.state.temperature()
                );
                self.note(format!("temperature alert at {:.1}°C", self.state.temperature()));
                self.alarm.play();
            }
            Some(AlertEdge::Cleared) => self.alarm.stop(),
            None => {}
        }
    }

    pub fn seed(&mut self, snapshot: Snapshot) {
        info!(
            "Initial snapshot: {:.1}°C, prediction {:.1}°C, battery {:.0}%",
            snapshot.temperature, snapshot.prediction, snapshot.battery
        );
        self.apply(DashboardEvent::Snapshot {
            snapshot,
            at: OffsetDateTime::now_utc(),
        });
    }

    pub fn on_source_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Connected => {
                info!("Sample source connected");
                self.note("sample source connected".to_string());
                self.apply(DashboardEvent::ChannelConnected);
            }
            SourceEvent::Disconnected => {
                warn!("Sample source disconnected");
                self.note("sample source disconnected".to_string());
                self.apply(DashboardEvent::ChannelDisconnected);
            }
            SourceEvent::Update(update) => self.apply(DashboardEvent::Sample {
                update,
                at: OffsetDateTime::now_utc(),
            }),
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::AllowSound => {
                self.sound_prompt = false;
                match self.alarm.request_enable() {
                    Ok(()) => {
                        self.advisory = None;
                        self.apply(DashboardEvent::SoundGranted);
                    }
                    Err(e) => {
                        warn!("Sound enable failed: {}", e);
                        self.advisory = Some(SOUND_FAILED_ADVISORY.to_string());
                        self.apply(DashboardEvent::SoundDenied);
                    }
                }
            }
            Command::DenySound => {
                self.sound_prompt = false;
                self.advisory = Some(SOUND_DECLINED_ADVISORY.to_string());
                self.apply(DashboardEvent::SoundDenied);
            }
            Command::Acknowledge => self.apply(DashboardEvent::AcknowledgeAlert),
            Command::Download => {
                self.downloads.retain(|task| !task.is_finished());
                if let Some(task) = self.exporter.download_report(self.state.is_online()) {
                    info!("Report download started");
                    self.note("report download started".to_string());
                    self.downloads.push(task);
                }
            }
            // Handled by the run loop
            Command::Quit => {}
        }
    }

    /// Remember an event for the status line, stamped with the UTC clock
    fn note(&mut self, message: String) {
        self.status = Some(format!(
            "{} {}",
            format_clock(&OffsetDateTime::now_utc()),
            message
        ));
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(
            &self.state,
            &self.device_name,
            self.mode,
            self.sound_prompt,
            self.advisory.clone(),
        )
        .with_status(self.status.clone())
    }

    fn redraw(&mut self) {
        let screen = render(&self.view());
        // Clear screen and move cursor to top
        let _ = write!(self.screen, "\x1B[2J\x1B[1;1H{}", screen);
        let _ = self.screen.flush();
    }

    /// Multiplex source events, staleness ticks and commands until quit
    ///
    /// Tears down the source task, pending downloads and the alarm before
    /// returning.
    pub async fn run(
        mut self,
        source: Box<dyn SampleSource>,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let (tx, mut events) = mpsc::channel(SOURCE_BUFFER);
        info!("Starting {} sample source", source.name());
        let source_task = source.start(tx);

        let mut ticker = interval(STALENESS_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut commands_open = true;

        loop {
            self.redraw();

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_source_event(event),
                    None => {
                        warn!("Sample source stopped");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.apply(DashboardEvent::Tick(OffsetDateTime::now_utc()));
                }
                command = commands.recv(), if commands_open => match command {
                    Some(Command::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => commands_open = false,
                },
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        source_task.abort();
        for task in self.downloads.drain(..) {
            task.abort();
        }
        self.alarm.stop();
    }
}
