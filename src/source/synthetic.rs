/// Deterministic oscillating feed for running without a backend
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::models::SensorUpdate;
use crate::source::{SampleSource, SourceEvent};
use crate::utils::round1;

const START_TEMPERATURE: f64 = 32.9;
const STEP: f64 = 0.4;
const CEILING: f64 = 41.0;
const WRAP_TO: f64 = 32.5;

pub struct SyntheticSource {
    period: Duration,
    current: f64,
}

impl SyntheticSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            current: START_TEMPERATURE,
        }
    }
}

/// Next value of the sawtooth: one step up, wrapping once past the ceiling
pub fn next_temperature(current: f64) -> f64 {
    let next = round1(current + STEP);
    if next > CEILING {
        WRAP_TO
    } else {
        next
    }
}

impl SampleSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn start(self: Box<Self>, tx: mpsc::Sender<SourceEvent>) -> JoinHandle<()> {
        let SyntheticSource {
            period,
            mut current,
        } = *self;

        tokio::spawn(async move {
            info!("Synthetic source started, one sample every {:?}", period);
            if tx.send(SourceEvent::Connected).await.is_err() {
                return;
            }

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                current = next_temperature(current);
                debug!("Synthetic sample {:.1}", current);

                let update = SensorUpdate {
                    temperature: current,
                    battery: None,
                    prediction: None,
                };
                if tx.send(SourceEvent::Update(update)).await.is_err() {
                    debug!("Dashboard gone, stopping synthetic source");
                    break;
                }
            }
        })
    }
}
