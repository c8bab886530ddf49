//! Wiring shared by the command handlers: config, recordings folder and the
//! real capture, playback and share engines.

use crate::config::WaveletConfig;
use crate::library::{FileStore, ListController};
use crate::permissions::SystemProbe;
use crate::playback::detect_or_missing;
use crate::recording::{CpalCaptureFactory, SessionController};
use crate::share::ClipboardShare;

pub struct AppContext {
    pub config: WaveletConfig,
    pub store: FileStore,
}

impl AppContext {
    /// # Errors
    /// - If no recordings directory can be determined
    pub fn new(config: WaveletConfig) -> anyhow::Result<Self> {
        let store = FileStore::new(config.recordings_dir()?);
        tracing::debug!("Recordings folder: {}", store.dir().display());
        Ok(Self { config, store })
    }

    /// Loads the config file and resolves the recordings folder.
    ///
    /// # Errors
    /// - If the config file is malformed
    /// - If no recordings directory can be determined
    pub fn load() -> anyhow::Result<Self> {
        Self::new(WaveletConfig::load()?)
    }

    pub fn session(&self) -> SessionController {
        let audio = &self.config.audio;
        tracing::info!(
            "Audio config: device={}, sample_rate={}Hz, reference_level={}dBFS",
            audio.device,
            audio.sample_rate,
            audio.reference_level_db
        );
        SessionController::new(
            self.store.clone(),
            Box::new(CpalCaptureFactory::new(audio.device.clone(), audio.sample_rate)),
            Box::new(SystemProbe::new(
                audio.device.clone(),
                self.store.dir().to_path_buf(),
            )),
        )
    }

    /// # Errors
    /// - If the recordings folder exists but cannot be read
    pub fn list_controller(&self) -> anyhow::Result<ListController> {
        Ok(ListController::new(
            self.store.clone(),
            detect_or_missing(self.config.playback.player.as_deref()),
            Box::new(ClipboardShare),
        )?)
    }
}
