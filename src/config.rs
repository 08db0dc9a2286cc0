// src/config.rs
use std::env;
use std::time::Duration;

use crate::services::DEFAULT_CHANNEL_CAPACITY;

/// Runtime configuration, read from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub sweep_interval: Duration,
    pub channel_capacity: usize,
    /// Optional JSON snapshot loaded on startup.
    pub data_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            sweep_interval: Duration::from_secs(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            data_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            sweep_interval: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            channel_capacity: env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.channel_capacity),
            data_file: env::var("DATA_FILE").ok(),
        }
    }
}
