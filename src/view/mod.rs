pub mod classify;
pub mod forecast;
pub mod render;

pub use render::{render, DashboardView};
