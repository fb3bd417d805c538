//! Configuration and file management for pr-briefing
//!
//! This crate provides:
//! - Platform config directory
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::{AppConfig, DEFAULT_ANALYSIS_CACHE_CAPACITY, DEFAULT_MAX_CONCURRENT_ANALYSES};
pub use config_file::{load_config_file, load_config_file_from, CONFIG_FILE};
pub use paths::config_dir;

/// Application name used for directories and file names
pub const APP_NAME: &str = "pr-briefing";
