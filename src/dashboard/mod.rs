pub mod state;
pub mod window;

pub use state::{AlertEdge, DashboardEvent, DashboardState, ALERT_THRESHOLD};
