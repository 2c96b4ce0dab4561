pub mod bell;
pub mod controller;

pub use bell::TerminalBellBackend;
pub use controller::{AlarmController, AudioBackend, AudioHandle};
