//! First-run setup.
//!
//! Writes the default configuration file when none exists yet.

use crate::config;
use std::path::Path;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/wavelet.toml");

/// Creates the config file from the embedded template if it is missing.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_path = config::config_path()?;
    if write_default_config(&config_path)? {
        tracing::info!("Created default config: {}", config_path.display());
    } else {
        tracing::debug!("Config present: {}", config_path.display());
    }
    Ok(())
}

/// Returns true if the file was created.
fn write_default_config(config_path: &Path) -> anyhow::Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveletConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = WaveletConfig::parse(DEFAULT_CONFIG).unwrap();
        let defaults = WaveletConfig::default();
        assert_eq!(config.audio.device, defaults.audio.device);
        assert_eq!(config.audio.sample_rate, defaults.audio.sample_rate);
        assert_eq!(config.ui.splash_ms, defaults.ui.splash_ms);
        assert_eq!(config.ui.toast_ms, defaults.ui.toast_ms);
        assert!(config.storage.recordings_dir.is_none());
    }

    #[test]
    fn test_existing_config_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("wavelet.toml");

        assert!(write_default_config(&path).unwrap());
        std::fs::write(&path, "[ui]\nsplash_ms = 0\n").unwrap();
        assert!(!write_default_config(&path).unwrap());

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[ui]\nsplash_ms = 0\n"
        );
    }
}
