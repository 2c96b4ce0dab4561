/// Audible alarm controller owning a single reusable audio handle
use log::{debug, info};

use crate::error::AudioError;

/// Source of audio handles (sound card, terminal bell, test double)
pub trait AudioBackend: Send {
    fn open(&mut self) -> Result<Box<dyn AudioHandle>, AudioError>;
}

/// A looping sound that can be started, paused and rewound
pub trait AudioHandle: Send {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn rewind(&mut self);
}

pub struct AlarmController {
    backend: Box<dyn AudioBackend>,
    handle: Option<Box<dyn AudioHandle>>,
    enabled: bool,
}

impl AlarmController {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            handle: None,
            enabled: false,
        }
    }

    /// Open the audio handle once and prove playback is permitted
    ///
    /// Runs a silent play/pause/rewind cycle on the handle. Once enabled,
    /// further calls leave the handle alone so a ringing alarm keeps ringing.
    ///
    /// # Returns
    /// Ok once sound is enabled, or the reason playback was refused
    pub fn request_enable(&mut self) -> Result<(), AudioError> {
        if self.enabled {
            return Ok(());
        }
        if self.handle.is_none() {
            self.handle = Some(self.backend.open()?);
        }

        let handle = match self.handle.as_mut() {
            Some(handle) => handle,
            None => return Err(AudioError::Unavailable("no audio handle".into())),
        };

        handle.play()?;
        handle.pause();
        handle.rewind();

        self.enabled = true;
        info!("Alarm sound enabled");
        Ok(())
    }

    /// Start looping playback if sound was enabled
    pub fn play(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.play() {
                debug!("Alarm playback failed: {}", e);
            }
        }
    }

    /// Pause and rewind; harmless when nothing is playing
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
            handle.rewind();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Calls recorded by [`RecordingBackend`] handles
    #[derive(Debug, Default)]
    pub struct Recording {
        pub opened: usize,
        pub calls: Vec<&'static str>,
    }

    pub struct RecordingBackend {
        pub log: Arc<Mutex<Recording>>,
        pub refuse: bool,
    }

    struct RecordingHandle {
        log: Arc<Mutex<Recording>>,
        refuse: bool,
    }

    impl RecordingBackend {
        pub fn new(refuse: bool) -> (Self, Arc<Mutex<Recording>>) {
            let log = Arc::new(Mutex::new(Recording::default()));
            (
                Self {
                    log: log.clone(),
                    refuse,
                },
                log,
            )
        }
    }

    impl AudioBackend for RecordingBackend {
        fn open(&mut self) -> Result<Box<dyn AudioHandle>, AudioError> {
            self.log.lock().unwrap().opened += 1;
            Ok(Box::new(RecordingHandle {
                log: self.log.clone(),
                refuse: self.refuse,
            }))
        }
    }

    impl AudioHandle for RecordingHandle {
        fn play(&mut self) -> Result<(), AudioError> {
            if self.refuse {
                return Err(AudioError::PermissionDenied("autoplay blocked".into()));
            }
            self.log.lock().unwrap().calls.push("play");
            Ok(())
        }

        fn pause(&mut self) {
            self.log.lock().unwrap().calls.push("pause");
        }

        fn rewind(&mut self) {
            self.log.lock().unwrap().calls.push("rewind");
        }
    }
}
