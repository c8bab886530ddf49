//! Display recent log entries from the application.

use crate::logging;
use anyhow::anyhow;
use std::fs;
use std::path::Path;

const DEFAULT_LINES: usize = 50;

/// Prints the tail of the newest log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = logging::log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = logging::log_files(&log_dir)
        .map_err(|e| anyhow!("Failed to read log directory: {e}"))?
        .into_iter()
        .next()
    else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'wavelet' to generate logs.");
        return Ok(());
    };

    print_tail(&log_file, DEFAULT_LINES)
}

fn print_tail(log_file: &Path, count: usize) -> anyhow::Result<()> {
    let content =
        fs::read_to_string(log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines = tail(&content, count);
    let total = content.lines().count();
    if lines.len() < total {
        println!("Showing last {} of {} lines:", lines.len(), total);
    } else {
        println!("Showing all {total} lines:");
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn tail(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].to_vec()
}
