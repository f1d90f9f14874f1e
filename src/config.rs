//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the disk tier directory under the storage root.
pub const DEFAULT_CACHE_DIR: &str = "images";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Total cost the memory tier may hold before evicting (0 = unbounded)
    pub max_total_cost: u64,
    /// Persistent storage root the disk tier lives under
    pub storage_root: PathBuf,
    /// Name of the disk tier directory inside `storage_root`
    pub cache_dir_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `IMAGEKIT_MAX_TOTAL_COST` - Memory tier cost limit (default: 0, unbounded)
    /// - `IMAGEKIT_STORAGE_ROOT` - Disk tier root (default: platform documents directory)
    /// - `IMAGEKIT_CACHE_DIR` - Disk tier directory name (default: `images`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_total_cost: env::var("IMAGEKIT_MAX_TOTAL_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_total_cost),
            storage_root: env::var_os("IMAGEKIT_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            cache_dir_name: env::var("IMAGEKIT_CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_dir_name),
        }
    }

    /// Directory holding one file per cached key.
    pub fn cache_dir(&self) -> PathBuf {
        self.storage_root.join(&self.cache_dir_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_total_cost: 0,
            storage_root: dirs::document_dir().unwrap_or_else(|| PathBuf::from(".")),
            cache_dir_name: DEFAULT_CACHE_DIR.to_string(),
        }
    }
}
