//! Application settings

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial link settings
    pub link: LinkSettings,
    /// Terminal behavior
    pub terminal: TerminalSettings,
}

impl AppConfig {
    /// Load config from the default location; missing file means defaults.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path; missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = super::config_dir().ok_or("Could not determine config directory")?;
        std::fs::create_dir_all(&dir)?;
        self.save_to(&dir.join("config.toml"))
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Serial link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Port name (e.g., COM6, /dev/ttyACM0)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Blocking read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Read loop poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl LinkSettings {
    /// Settings for a port at the given baud rate with default timings.
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
            read_timeout_ms: 50,
            poll_interval_ms: 20,
        }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::new("COM6", 115_200)
    }
}

/// Terminal behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Prompt prefix protected from editing
    pub prompt: String,
    /// Prefix rendered events with a wall-clock timestamp
    pub show_timestamps: bool,
    /// Session event channel capacity
    pub event_capacity: usize,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            prompt: "FRAM> ".to_string(),
            show_timestamps: true,
            event_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_device() {
        let config = AppConfig::default();
        assert_eq!(config.link.baud_rate, 115_200);
        assert_eq!(config.terminal.prompt, "FRAM> ");
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.link.port = "/dev/ttyACM3".to_string();
        config.link.baud_rate = 9600;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.link.port, "/dev/ttyACM3");
        assert_eq!(loaded.link.baud_rate, 9600);
        assert_eq!(loaded.terminal.event_capacity, 1024);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.link.port, "COM6");
    }
}
