//! Configuration module
//!
//! Settings for the catalog endpoint, display and user-facing messages.

pub mod config;

pub use config::Config;
