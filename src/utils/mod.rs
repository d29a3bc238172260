//! Utility functions and helpers
//!
//! Logging plumbing and per-user paths shared by every front end.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
