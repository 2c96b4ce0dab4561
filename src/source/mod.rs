/// Pluggable sample sources feeding the dashboard
pub mod synthetic;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::SensorUpdate;

pub use synthetic::SyntheticSource;

/// What a source delivers to the dashboard runtime, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Connected,
    Disconnected,
    Update(SensorUpdate),
}

/// A producer of [`SourceEvent`]s running on its own task
///
/// The runtime owns the returned handle and aborts it on shutdown. A source
/// stops by itself once the receiving side is dropped.
pub trait SampleSource: Send {
    fn name(&self) -> &'static str;

    fn start(self: Box<Self>, tx: mpsc::Sender<SourceEvent>) -> JoinHandle<()>;
}
