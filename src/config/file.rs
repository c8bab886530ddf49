//! Configuration file management for wavelet.
//!
//! Settings live in `~/.config/wavelet/wavelet.toml`. Every field has a
//! default, so a partial or missing file still yields a usable config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "wavelet";
const CONFIG_FILE: &str = "wavelet.toml";

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `wavelet list-devices`
    /// - device name from `wavelet list-devices`
    pub device: String,
    /// Recording sample rate in Hz
    pub sample_rate: u32,
    /// Reference level in dBFS for 100% meter display (typical: -20 to -6 dBFS)
    pub reference_level_db: i8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            sample_rate: 16000,
            reference_level_db: -20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the recordings folder.
    pub recordings_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Player command, e.g. "mpv --no-video". Detected when unset.
    pub player: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub splash_ms: u64,
    pub toast_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            splash_ms: 3000,
            toast_ms: 1500,
        }
    }
}

impl UiConfig {
    pub fn splash_duration(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveletConfig {
    pub audio: AudioConfig,
    pub storage: StorageConfig,
    pub playback: PlaybackConfig,
    pub ui: UiConfig,
}

impl WaveletConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        Self::parse(&config_content)
    }

    /// # Errors
    /// - If the TOML is malformed
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The recordings folder: the configured override, otherwise
    /// `<music dir>/wavelet/Recordings`, falling back to the data dir.
    ///
    /// # Errors
    /// - If no suitable base directory exists
    pub fn recordings_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.storage.recordings_dir {
            return Ok(expand_home(dir));
        }
        dirs::audio_dir()
            .or_else(dirs::data_dir)
            .map(|base| base.join(APP_DIR).join("Recordings"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine a recordings directory"))
    }
}

/// Replaces a leading `~` with the home directory.
fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// `~/.config/wavelet`
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join(APP_DIR))
}

/// Path of the config file; it may not exist yet.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}
