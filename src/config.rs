//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ITEMS, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::state::ColorScheme;

/// Application configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the durable key-value file
    pub data_path: PathBuf,
    /// Maximum number of cache entries kept after a sweep
    pub max_cache_items: usize,
    /// Seconds between cache sweeps
    pub sweep_interval: u64,
    /// Local API port
    pub server_port: u16,
    /// Colour scheme reported by the platform at startup
    pub platform_scheme: ColorScheme,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CINESTORE_DATA_PATH` - Store file (default: cinestore-data.json)
    /// - `MAX_CACHE_ITEMS` - Cache entry budget (default: 100)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    /// - `SERVER_PORT` - Local API port (default: 3000)
    /// - `PLATFORM_SCHEME` - `light` or `dark` (default: light)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env::var("CINESTORE_DATA_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            max_cache_items: env::var("MAX_CACHE_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_items),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            platform_scheme: env::var("PLATFORM_SCHEME")
                .ok()
                .and_then(|v| parse_scheme(&v))
                .unwrap_or(defaults.platform_scheme),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("cinestore-data.json"),
            max_cache_items: DEFAULT_MAX_ITEMS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            server_port: 3000,
            platform_scheme: ColorScheme::Light,
        }
    }
}

fn parse_scheme(raw: &str) -> Option<ColorScheme> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "light" => Some(ColorScheme::Light),
        "dark" => Some(ColorScheme::Dark),
        _ => None,
    }
}
