//! Shared utilities for the Udhaar client.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, format_relative};
