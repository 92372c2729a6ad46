pub mod app;
pub mod config;
pub mod constants;
pub mod gpu;
pub mod listing;
pub mod resources;
pub mod state;

pub use gpu::{GpuContext, error::GpuError, error::GpuResult};
