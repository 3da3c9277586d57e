//! Cache configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_CAPACITY: usize = 4096;

/// Tunables for the artwork cache, sourced from `atelier.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to send every read straight to the store.
    pub enabled: bool,
    /// Time-to-live for every entry, in seconds.
    pub ttl_secs: u64,
    /// Upper bound on resident entries; population is skipped beyond it.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL_SECS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(1))
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_secs: settings.ttl_secs,
            capacity: settings.capacity,
        }
    }
}
