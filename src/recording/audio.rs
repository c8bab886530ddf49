//! Microphone capture engine.
//!
//! Captures from the configured input device at its native rate, mixes down to
//! mono, buffers PCM in memory and on finish encodes it with ffmpeg through a
//! temporary WAV file.

use super::engine::{CaptureEngine, CaptureFactory, CaptureFormat};
use super::ffmpeg::find_ffmpeg;
use crate::error::CaptureError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Creates [`CpalCapture`] engines for a device and target sample rate.
pub struct CpalCaptureFactory {
    device_name: String,
    sample_rate: u32,
}

impl CpalCaptureFactory {
    pub fn new(device_name: String, sample_rate: u32) -> Self {
        Self {
            device_name,
            sample_rate,
        }
    }
}

impl CaptureFactory for CpalCaptureFactory {
    fn create(&self) -> Box<dyn CaptureEngine> {
        Box::new(CpalCapture::new(self.sample_rate, self.device_name.clone()))
    }
}

/// Records one session from an input device.
pub struct CpalCapture {
    /// Rate the encoded file is written at
    target_sample_rate: u32,
    /// Rate the device actually delivers
    device_sample_rate: u32,
    /// Captured mono PCM
    samples: Arc<Mutex<Vec<i16>>>,
    /// Live input stream; dropping it releases the device
    stream: Option<cpal::Stream>,
    is_paused: Arc<AtomicBool>,
    /// "default", a device name or an index from `list-devices`
    device_name: String,
    output: Option<(PathBuf, CaptureFormat)>,
}

impl CpalCapture {
    pub fn new(target_sample_rate: u32, device_name: String) -> Self {
        Self {
            target_sample_rate,
            device_sample_rate: target_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            is_paused: Arc::new(AtomicBool::new(false)),
            device_name,
            output: None,
        }
    }

    fn build_stream(
        &self,
        device: &cpal::Device,
        config: &cpal::SupportedStreamConfig,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = usize::from(config.channels());
        let stream_config: cpal::StreamConfig = config.clone().into();
        let on_error = |err: cpal::StreamError| tracing::error!("Audio stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::I16 => {
                let samples = Arc::clone(&self.samples);
                let paused = Arc::clone(&self.is_paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if !paused.load(Ordering::Relaxed) {
                            append_mono(data, &samples, channels);
                        }
                    },
                    on_error,
                    None,
                )
            }
            cpal::SampleFormat::F32 => {
                let samples = Arc::clone(&self.samples);
                let paused = Arc::clone(&self.is_paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if !paused.load(Ordering::Relaxed) {
                            let converted: Vec<i16> = data
                                .iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
                                .collect();
                            append_mono(&converted, &samples, channels);
                        }
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CaptureError::StartFailed(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        };

        stream.map_err(|e| CaptureError::StartFailed(e.to_string()))
    }

    /// Writes buffered samples as a 16-bit mono WAV.
    fn save_wav(&self, samples: &[i16], path: &Path) -> Result<(), CaptureError> {
        let wav_spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.device_sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let finalize_err = |e: hound::Error| CaptureError::FinalizeFailed(e.to_string());
        let mut writer = WavWriter::create(path, wav_spec).map_err(finalize_err)?;
        for &sample in samples {
            writer.write_sample(sample).map_err(finalize_err)?;
        }
        writer.finalize().map_err(finalize_err)?;

        tracing::debug!("Temporary WAV created: {}", path.display());
        Ok(())
    }

    /// Encodes the WAV into the fixed container and codec.
    fn encode(&self, input_wav: &Path, output: &Path, format: &CaptureFormat) -> Result<(), CaptureError> {
        let ffmpeg_path =
            find_ffmpeg().map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;

        let result = Command::new(&ffmpeg_path)
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(input_wav)
            .arg("-c:a")
            .arg(format.codec)
            .arg("-b:a")
            .arg(format.bitrate)
            .arg("-ac")
            .arg(format.channels.to_string())
            .arg("-ar")
            .arg(self.target_sample_rate.to_string())
            .arg("-f")
            .arg(format.container)
            .arg("-y")
            .arg(output)
            .output()
            .map_err(|e| CaptureError::FinalizeFailed(format!("could not run ffmpeg: {e}")))?;

        if result.status.success() {
            tracing::debug!("Audio encoded as {}/{}", format.container, format.codec);
            Ok(())
        } else {
            let error_msg = String::from_utf8_lossy(&result.stderr);
            tracing::error!("ffmpeg encoding failed: {}", error_msg);
            Err(CaptureError::FinalizeFailed(format!(
                "audio encoding failed: {}",
                error_msg.trim()
            )))
        }
    }

    fn temp_wav_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("wavelet_{}.wav", std::process::id()))
    }

    fn buffered(&self) -> Vec<i16> {
        match self.samples.lock() {
            Ok(samples) => samples.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CaptureEngine for CpalCapture {
    fn start(&mut self, output: &Path, format: &CaptureFormat) -> Result<(), CaptureError> {
        let device = resolve_input_device(&self.device_name)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device
            .default_input_config()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        self.device_sample_rate = device_config.sample_rate().0;

        if self.device_sample_rate != self.target_sample_rate {
            tracing::debug!(
                "Device delivers {}Hz; output will be resampled to {}Hz",
                self.device_sample_rate,
                self.target_sample_rate
            );
        }

        let stream = self.build_stream(&device, &device_config)?;
        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        self.stream = Some(stream);
        self.output = Some((output.to_path_buf(), *format));
        tracing::debug!(
            "Audio stream started: {}Hz, {} channels",
            self.device_sample_rate,
            device_config.channels()
        );
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::PauseFailed("stream not running".to_string()));
        }
        self.is_paused.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::ResumeFailed("stream not running".to_string()));
        }
        self.is_paused.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), CaptureError> {
        // Release the device before encoding.
        self.stream = None;

        let Some((output, format)) = self.output.take() else {
            return Err(CaptureError::FinalizeFailed("recording was never started".to_string()));
        };

        let samples = self.buffered();
        if samples.is_empty() {
            tracing::warn!("Recording stopped with no samples captured");
            return Err(CaptureError::FinalizeFailed("no audio was captured".to_string()));
        }

        let duration_secs = samples.len() as f32 / self.device_sample_rate as f32;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.device_sample_rate
        );

        let temp_wav = self.temp_wav_path();
        let result = self
            .save_wav(&samples, &temp_wav)
            .and_then(|()| self.encode(&temp_wav, &output, &format));

        if let Err(e) = std::fs::remove_file(&temp_wav) {
            tracing::debug!("Failed to remove temp file: {}", e);
        }
        result?;

        let file_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        tracing::info!("Audio saved: {} ({} bytes)", output.display(), file_size);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.device_sample_rate
    }

    fn recent_samples(&self, max: usize) -> Vec<i16> {
        let Ok(samples) = self.samples.lock() else {
            return Vec::new();
        };
        let start = samples.len().saturating_sub(max);
        samples[start..].to_vec()
    }
}

/// Mixes interleaved frames down to mono and appends them.
fn append_mono(data: &[i16], samples: &Arc<Mutex<Vec<i16>>>, num_channels: usize) {
    let Ok(mut samples) = samples.lock() else {
        return;
    };
    mix_to_mono(data, num_channels, &mut samples);
}

fn mix_to_mono(data: &[i16], num_channels: usize, out: &mut Vec<i16>) {
    match num_channels {
        0 | 1 => out.extend_from_slice(data),
        _ => {
            for frame in data.chunks_exact(num_channels) {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                out.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Finds an input device by "default", name, or numeric index.
///
/// # Errors
/// - If no matching device exists
pub(crate) fn resolve_input_device(device_spec: &str) -> Result<cpal::Device, CaptureError> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if device_spec == "default" {
            return host
                .default_input_device()
                .ok_or(CaptureError::NoInputDevice);
        }

        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| CaptureError::StartFailed(format!("failed to enumerate devices: {e}")))?
            .collect();

        if let Ok(index) = device_spec.parse::<usize>() {
            return devices
                .into_iter()
                .nth(index)
                .ok_or_else(|| CaptureError::DeviceNotFound(device_spec.to_string()));
        }

        devices
            .into_iter()
            .find(|device| device.name().is_ok_and(|name| name == device_spec))
            .ok_or_else(|| CaptureError::DeviceNotFound(device_spec.to_string()))
    })
}

/// Temporarily redirects stderr to /dev/null to hide ALSA chatter on Linux.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let Ok(dev_null) = OpenOptions::new().write(true).open("/dev/null") else {
        return f();
    };

    // SAFETY: dup/dup2/close on valid descriptors; stderr is restored before returning.
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }
    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
