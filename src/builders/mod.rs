//! Fluent Builders
//!
//! Builders for configuration objects.

pub mod config;

pub use config::{config, ConfigBuilder, ConfigError};
