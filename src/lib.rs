// Library surface for headless/integration tests and reuse.
// Terminal drawing stays in the binary.
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod celebration;
pub mod config;
pub mod error;
pub mod question;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod sprint;
pub mod store;

pub use error::{Result, SprintError};
pub use sprint::{Signal, Sprint};

/// Interval of the countdown tick
pub const TICK_RATE_MS: u64 = 100;
