/// Terminal bell as the alarm sound output
use std::io::{IsTerminal, Write};

use log::debug;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::alarm::controller::{AudioBackend, AudioHandle};
use crate::error::AudioError;

const BELL: &[u8] = b"\x07";

/// Opens bell handles when stdout is an interactive terminal
pub struct TerminalBellBackend {
    period: Duration,
}

impl TerminalBellBackend {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl AudioBackend for TerminalBellBackend {
    fn open(&mut self) -> Result<Box<dyn AudioHandle>, AudioError> {
        if !std::io::stdout().is_terminal() {
            return Err(AudioError::Unavailable("stdout is not a terminal".into()));
        }
        Ok(Box::new(TerminalBell {
            period: self.period,
            task: None,
        }))
    }
}

/// Rings the bell once per period while playing
struct TerminalBell {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl AudioHandle for TerminalBell {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.task.is_some() {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        let period = self.period;
        self.task = Some(runtime.spawn(async move {
            loop {
                // Wait first so the silent enable cycle makes no sound
                sleep(period).await;
                let mut stdout = std::io::stdout();
                if let Err(e) = stdout.write_all(BELL).and_then(|_| stdout.flush()) {
                    debug!("Bell write failed: {}", e);
                    break;
                }
            }
        }));
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn rewind(&mut self) {
        // The bell has no playback position
    }
}

impl Drop for TerminalBell {
    fn drop(&mut self) {
        self.pause();
    }
}
