//! Capture engine boundary.
//!
//! The session controller only talks to these traits; the cpal/ffmpeg
//! implementation lives in [`super::audio`].

use crate::error::CaptureError;
use std::path::Path;

/// Fixed encoding parameters for every recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    /// ffmpeg muxer name
    pub container: &'static str,
    /// ffmpeg audio codec name
    pub codec: &'static str,
    /// Output bitrate passed to the encoder
    pub bitrate: &'static str,
    /// File extension of the finished recording
    pub extension: &'static str,
    pub channels: u16,
}

/// Mono AAC in an MPEG-4 container.
pub const CAPTURE_FORMAT: CaptureFormat = CaptureFormat {
    container: "mp4",
    codec: "aac",
    bitrate: "96k",
    extension: "mp4",
    channels: 1,
};

/// One recording session's worth of capture.
///
/// An engine is opened once with [`CaptureEngine::start`] and released exactly
/// once, either by [`CaptureEngine::finish`] or by being dropped.
pub trait CaptureEngine {
    /// Prepares the input and starts writing to `output`.
    fn start(&mut self, output: &Path, format: &CaptureFormat) -> Result<(), CaptureError>;

    fn pause(&mut self) -> Result<(), CaptureError>;

    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Stops capture, writes the encoded file and releases the input.
    fn finish(self: Box<Self>) -> Result<(), CaptureError>;

    /// Whether pause/resume can be used on this engine.
    fn supports_pause(&self) -> bool {
        true
    }

    /// Sample rate of the values returned by [`CaptureEngine::recent_samples`].
    fn sample_rate(&self) -> u32 {
        0
    }

    /// Up to `max` of the most recent mono samples, for level metering.
    fn recent_samples(&self, _max: usize) -> Vec<i16> {
        Vec::new()
    }
}

/// Produces a fresh engine for each session.
pub trait CaptureFactory {
    fn create(&self) -> Box<dyn CaptureEngine>;
}
