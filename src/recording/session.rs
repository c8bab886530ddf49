//! Recording session state machine.
//!
//! `Idle --start--> Recording --pause--> Paused --resume--> Recording`, and
//! `stop` from either active state back to `Idle`. Calls outside those edges
//! are ignored. The controller owns the single capture engine of the active
//! session and releases it exactly once.

use super::engine::{CaptureEngine, CaptureFactory, CAPTURE_FORMAT};
use super::timer::{format_elapsed, Clock, ElapsedTimer, SystemClock, Ticker};
use crate::error::SessionError;
use crate::library::FileStore;
use crate::permissions::{PermissionProbe, Permissions};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;

const IDLE_DISPLAY: &str = "00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Paused,
}

/// Result of a session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started(PathBuf),
    Paused,
    Resumed,
    /// Carries the finished file
    Stopped(PathBuf),
    /// The command is not valid in the current state.
    Ignored,
}

/// Drives one capture engine through a recording session.
pub struct SessionController<C: Clock = SystemClock> {
    store: FileStore,
    factory: Box<dyn CaptureFactory>,
    probe: Box<dyn PermissionProbe>,
    clock: C,
    state: SessionState,
    engine: Option<Box<dyn CaptureEngine>>,
    output_path: Option<PathBuf>,
    started_at: Option<DateTime<Local>>,
    pause_supported: bool,
    timer: ElapsedTimer,
    ticker: Ticker,
    display: String,
}

impl SessionController<SystemClock> {
    pub fn new(
        store: FileStore,
        factory: Box<dyn CaptureFactory>,
        probe: Box<dyn PermissionProbe>,
    ) -> Self {
        Self::with_clock(store, factory, probe, SystemClock)
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(
        store: FileStore,
        factory: Box<dyn CaptureFactory>,
        probe: Box<dyn PermissionProbe>,
        clock: C,
    ) -> Self {
        Self {
            store,
            factory,
            probe,
            clock,
            state: SessionState::Idle,
            engine: None,
            output_path: None,
            started_at: None,
            pause_supported: false,
            timer: ElapsedTimer::default(),
            ticker: Ticker::default(),
            display: IDLE_DISPLAY.to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Timer text as last refreshed by a tick or transition.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed(self.clock.now())
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    /// Runs the capability probe without starting anything.
    pub fn check_permissions(&self) -> Permissions {
        self.probe.check()
    }

    /// Whether the active session can pause. False while idle.
    pub fn can_pause(&self) -> bool {
        self.engine.is_some() && self.pause_supported
    }

    /// Starts a new session in a freshly named file.
    ///
    /// # Errors
    /// - If the microphone or recordings folder is unavailable
    /// - If the capture engine fails to start; the controller stays idle
    pub fn start(&mut self) -> Result<Transition, SessionError> {
        if self.state != SessionState::Idle {
            return Ok(Transition::Ignored);
        }

        if let Some(reason) = self.probe.check().denied_reason() {
            tracing::warn!("Recording blocked: {}", reason);
            return Err(SessionError::PermissionDenied(reason));
        }

        self.store.ensure_dir()?;
        let now = Local::now();
        let path = self.store.next_recording_path(now, CAPTURE_FORMAT.extension);

        let mut engine = self.factory.create();
        if let Err(e) = engine.start(&path, &CAPTURE_FORMAT) {
            tracing::error!("Failed to start recording: {}", e);
            return Err(e.into());
        }

        self.pause_supported = engine.supports_pause();
        if !self.pause_supported {
            tracing::info!("Capture engine does not support pause; pause/resume disabled");
        }
        self.engine = Some(engine);
        self.output_path = Some(path.clone());
        self.started_at = Some(now);
        self.state = SessionState::Recording;

        let instant = self.clock.now();
        self.timer.start(instant);
        self.ticker.arm(instant);
        self.display = IDLE_DISPLAY.to_string();

        tracing::info!("Recording started: {}", path.display());
        Ok(Transition::Started(path))
    }

    /// Suspends capture and freezes the timer.
    ///
    /// # Errors
    /// - If the engine fails to pause; the session keeps recording
    pub fn pause(&mut self) -> Result<Transition, SessionError> {
        if self.state != SessionState::Recording || !self.pause_supported {
            return Ok(Transition::Ignored);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(Transition::Ignored);
        };

        engine.pause()?;

        let now = self.clock.now();
        self.timer.pause(now);
        self.ticker.disarm();
        self.display = format_elapsed(self.timer.elapsed(now));
        self.state = SessionState::Paused;

        tracing::debug!("Recording paused at {}", self.display);
        Ok(Transition::Paused)
    }

    /// Continues capture; the timer picks up from the frozen value.
    ///
    /// # Errors
    /// - If the engine fails to resume; the session stays paused
    pub fn resume(&mut self) -> Result<Transition, SessionError> {
        if self.state != SessionState::Paused || !self.pause_supported {
            return Ok(Transition::Ignored);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(Transition::Ignored);
        };

        engine.resume()?;

        let now = self.clock.now();
        self.timer.resume(now);
        self.ticker.arm(now);
        self.state = SessionState::Recording;

        tracing::debug!("Recording resumed at {}", self.display);
        Ok(Transition::Resumed)
    }

    /// The dashboard's record button: starts when idle, resumes when paused.
    pub fn record(&mut self) -> Result<Transition, SessionError> {
        match self.state {
            SessionState::Idle => self.start(),
            SessionState::Paused => self.resume(),
            SessionState::Recording => Ok(Transition::Ignored),
        }
    }

    /// Finalizes the file and releases the engine.
    ///
    /// The controller returns to idle even when finalizing fails.
    ///
    /// # Errors
    /// - If the engine fails to write the recording
    pub fn stop(&mut self) -> Result<Transition, SessionError> {
        if self.state == SessionState::Idle {
            return Ok(Transition::Ignored);
        }

        let engine = self.engine.take();
        let path = self.output_path.take();
        self.started_at = None;
        self.pause_supported = false;
        self.state = SessionState::Idle;
        self.ticker.disarm();
        self.timer.reset();
        self.display = IDLE_DISPLAY.to_string();

        let (Some(engine), Some(path)) = (engine, path) else {
            return Ok(Transition::Ignored);
        };

        match engine.finish() {
            Ok(()) => {
                tracing::info!("Recording saved: {}", path.display());
                Ok(Transition::Stopped(path))
            }
            Err(e) => {
                tracing::error!("Failed to finalize {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    /// Refreshes the display when a tick is due. Returns true if it changed.
    pub fn poll_tick(&mut self) -> bool {
        if self.state != SessionState::Recording {
            return false;
        }
        let now = self.clock.now();
        if !self.ticker.poll(now) {
            return false;
        }
        let text = format_elapsed(self.timer.elapsed(now));
        if text == self.display {
            return false;
        }
        self.display = text;
        true
    }

    /// Recent samples and their rate from the active engine, for the meter.
    pub fn recent_samples(&self, max: usize) -> (Vec<i16>, u32) {
        match (&self.engine, self.state) {
            (Some(engine), SessionState::Recording) => {
                (engine.recent_samples(max), engine.sample_rate())
            }
            _ => (Vec::new(), 0),
        }
    }
}

impl<C: Clock> Drop for SessionController<C> {
    fn drop(&mut self) {
        if self.state != SessionState::Idle {
            tracing::info!("Session dropped while active; saving recording");
            if let Err(e) = self.stop() {
                tracing::error!("Failed to save recording on exit: {}", e);
            }
        }
    }
}
