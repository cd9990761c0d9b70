//! # Grapnel Utilities
//!
//! Shared utilities, logging, config, and helpers for Grapnel.
//!
//! This crate provides common functionality used across the Grapnel
//! workspace, including the logging infrastructure the unwind engine's
//! per-frame diagnostics are rendered through, built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
