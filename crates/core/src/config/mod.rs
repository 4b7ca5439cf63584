//! Configuration loading and management.
//!
//! This module provides functionality to load manager settings from a
//! `procman.toml` file, falling back to defaults when absent.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::ManagerConfig;
