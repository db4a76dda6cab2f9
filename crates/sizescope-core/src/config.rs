/// Configuration and settings management.
///
/// Settings are stored as TOML. Every field has a serde default so a partial
/// (or missing) file always loads.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the settings file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Directory holding `history.json` and the `results/` folder.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub stall: StallSettings,
    #[serde(default)]
    pub trim: TrimSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scan: ScanSettings::default(),
            stall: StallSettings::default(),
            trim: TrimSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSettings {
    /// Run the concurrent pre-count pass that estimates the total item count.
    #[serde(default = "default_pre_count")]
    pub pre_count: bool,
    /// Default for requests that do not say whether to skip dotfiles.
    #[serde(default)]
    pub ignore_hidden: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            pre_count: default_pre_count(),
            ignore_hidden: false,
        }
    }
}

/// Stall watchdog thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StallSettings {
    #[serde(default = "default_stall_threshold")]
    pub threshold_secs: u64,
    #[serde(default = "default_minimum_items")]
    pub minimum_items: u64,
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
}

impl Default for StallSettings {
    fn default() -> Self {
        Self {
            threshold_secs: default_stall_threshold(),
            minimum_items: default_minimum_items(),
            grace_period_secs: default_grace_period(),
        }
    }
}

/// Limits applied to the copy of a result that is written to disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimSettings {
    /// Depth (root = 0) from which children are kept only as leaf summaries.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Smallest size, in bytes, a leaf summary must have to be kept.
    #[serde(default = "default_min_size")]
    pub min_size: u64,
    /// Most siblings kept under one pruned directory.
    #[serde(default = "default_max_children")]
    pub max_children: usize,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            min_size: default_min_size(),
            max_children: default_max_children(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".sizescope"))
        .unwrap_or_else(|| PathBuf::from(".sizescope"))
}

fn default_pre_count() -> bool {
    true
}

fn default_stall_threshold() -> u64 {
    30
}

fn default_minimum_items() -> u64 {
    500
}

fn default_grace_period() -> u64 {
    10
}

fn default_max_depth() -> usize {
    4
}

fn default_min_size() -> u64 {
    1024 * 1024
}

fn default_max_children() -> usize {
    100
}

impl Settings {
    /// Load settings from a file, or return defaults if the file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to a file, creating the parent directory if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        default_data_dir().join(CONFIG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.scan.pre_count);
        assert!(!settings.scan.ignore_hidden);
        assert_eq!(settings.stall.threshold_secs, 30);
        assert_eq!(settings.stall.minimum_items, 500);
        assert_eq!(settings.stall.grace_period_secs, 10);
        assert_eq!(settings.trim.max_depth, 4);
        assert_eq!(settings.trim.min_size, 1_048_576);
        assert_eq!(settings.trim.max_children, 100);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/sizescope-test\"\n[stall]\nthreshold_secs = 5\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/sizescope-test"));
        assert_eq!(settings.stall.threshold_secs, 5);
        assert_eq!(settings.stall.minimum_items, 500);
        assert!(settings.scan.pre_count);
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.data_dir = tmp.path().to_path_buf();
        settings.scan.ignore_hidden = true;
        settings.trim.max_children = 7;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[stall\nthreshold_secs = ").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
