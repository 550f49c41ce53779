//! Configuration module
//!
//! Handles application settings persisted as TOML

mod settings;

pub use settings::{AppConfig, LinkSettings, TerminalSettings};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("io", "framlink", "Framlink").map(|dirs| dirs.config_dir().to_path_buf())
}
