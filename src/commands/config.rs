//! Configuration file editor command.
//!
//! Opens the wavelet configuration file in the user's preferred editor.

use crate::config;
use std::process::Command;

/// Opens the configuration file in the user's preferred editor.
///
/// Tries editors in this order:
/// 1. $EDITOR environment variable
/// 2. nano
/// 3. vi
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    crate::setup::run_setup()?;
    let config_path = config::config_path()?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    if let Err(e) = config::WaveletConfig::load() {
        eprintln!("Warning: the edited config does not parse: {e}");
        tracing::warn!("Edited config does not parse: {}", e);
    } else {
        tracing::info!("Config file edited successfully");
    }
    Ok(())
}

fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    ["nano", "vi"]
        .iter()
        .find(|editor| crate::recording::ffmpeg::find_tool(editor).is_some())
        .map(|editor| editor.to_string())
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}
