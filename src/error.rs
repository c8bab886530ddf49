//! Error types for the recorder's engine and storage seams.
//!
//! Each seam gets its own enum so that screens can turn a failure into a short
//! notification without inspecting strings. Command handlers wrap these in
//! `anyhow::Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a capture engine.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Audio input device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Failed to pause recording: {0}")]
    PauseFailed(String),

    #[error("Failed to resume recording: {0}")]
    ResumeFailed(String),

    #[error("Failed to save recording: {0}")]
    FinalizeFailed(String),
}

/// Failures raised by the recording session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Recording not allowed: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Could not prepare recordings folder: {0}")]
    Storage(#[from] std::io::Error),
}

/// Failures raised by a playback engine.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio file not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("No audio player found. Install ffplay, mpv or paplay, or set [playback] player")]
    NoPlayer,

    #[error("Failed to start audio player: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// Failures raised by the recordings file store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Recording not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("A recording named '{0}' already exists")]
    AlreadyExists(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(std::io::Error),

    #[error("Rename failed: {0}")]
    RenameFailed(std::io::Error),

    #[error("Could not read recordings folder: {0}")]
    ListFailed(std::io::Error),
}

/// Failures raised while handing a recording to other applications.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Audio file not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("No share target available (install wl-copy or xclip)")]
    NoTarget,

    #[error("Failed to share recording: {0}")]
    Failed(String),
}
