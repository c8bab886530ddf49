//! Audio playback through an external player process.
//!
//! A playback is a running child process; stopping it kills the process.
//! Players are silenced and detached from the terminal so they do not draw
//! over the TUI.

use crate::error::PlaybackError;
use crate::recording::ffmpeg::find_tool;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// One in-progress playback. Dropping it releases the player.
pub trait Playback {
    fn path(&self) -> &Path;

    /// True once the file has played to the end.
    fn is_finished(&mut self) -> bool;

    /// Stops playback. Calling it again does nothing.
    fn stop(&mut self);
}

/// Starts playbacks.
pub trait PlayerFactory {
    fn play(&self, path: &Path) -> Result<Box<dyn Playback>, PlaybackError>;
}

/// Candidate players with the arguments that make them headless and quiet.
#[cfg(target_os = "macos")]
const PLAYERS: &[(&str, &[&str])] = &[
    ("afplay", &[]),
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpv", &["--no-video", "--really-quiet"]),
];

#[cfg(not(target_os = "macos"))]
const PLAYERS: &[(&str, &[&str])] = &[
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpv", &["--no-video", "--really-quiet"]),
    ("paplay", &[]),
];

/// Resolves a player command once and spawns it per playback.
pub struct SystemPlayer {
    program: PathBuf,
    args: Vec<String>,
}

impl SystemPlayer {
    /// Uses `command` when given (program followed by arguments), otherwise
    /// the first installed player from the built-in list.
    ///
    /// # Errors
    /// - If no player can be found
    pub fn detect(command: Option<&str>) -> Result<Self, PlaybackError> {
        if let Some(command) = command {
            let mut parts = command.split_whitespace();
            let program = parts.next().ok_or(PlaybackError::NoPlayer)?;
            return Ok(Self {
                program: PathBuf::from(program),
                args: parts.map(String::from).collect(),
            });
        }

        PLAYERS
            .iter()
            .find_map(|(name, args)| {
                find_tool(name).map(|program| Self {
                    program,
                    args: args.iter().map(|a| a.to_string()).collect(),
                })
            })
            .ok_or(PlaybackError::NoPlayer)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl PlayerFactory for SystemPlayer {
    fn play(&self, path: &Path) -> Result<Box<dyn Playback>, PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::FileMissing(path.to_path_buf()));
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        tracing::info!(
            "Playing {} with {} (pid {})",
            path.display(),
            self.program.display(),
            child.id()
        );

        Ok(Box::new(ProcessPlayback {
            child: Some(child),
            path: path.to_path_buf(),
        }))
    }
}

/// Stands in when no player is installed; every play reports it.
pub struct MissingPlayer;

impl PlayerFactory for MissingPlayer {
    fn play(&self, _path: &Path) -> Result<Box<dyn Playback>, PlaybackError> {
        Err(PlaybackError::NoPlayer)
    }
}

/// Detects a player, falling back to [`MissingPlayer`] so the rest of the
/// list keeps working.
pub fn detect_or_missing(command: Option<&str>) -> Box<dyn PlayerFactory> {
    match SystemPlayer::detect(command) {
        Ok(player) => {
            tracing::debug!("Using player {}", player.program().display());
            Box::new(player)
        }
        Err(e) => {
            tracing::warn!("{}", e);
            Box::new(MissingPlayer)
        }
    }
}

pub struct ProcessPlayback {
    child: Option<Child>,
    path: PathBuf,
}

impl Playback for ProcessPlayback {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_finished(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!("Player exited with {}", status);
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to poll player: {}", e);
                false
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("Player already exited: {}", e);
            }
            if let Err(e) = child.wait() {
                tracing::warn!("Failed to reap player: {}", e);
            }
            tracing::debug!("Playback stopped: {}", self.path.display());
        }
    }
}

impl Drop for ProcessPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_rejected_before_spawning() {
        let player = SystemPlayer::detect(Some("sleep 30")).unwrap();
        let result = player.play(Path::new("/definitely/not/here.mp3"));
        assert!(matches!(result, Err(PlaybackError::FileMissing(_))));
    }

    #[test]
    fn test_stop_kills_running_player() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.mp3");
        std::fs::write(&file, b"x").unwrap();

        let player = SystemPlayer::detect(Some("tail -f")).unwrap();
        let mut playback = player.play(&file).unwrap();
        assert!(!playback.is_finished());

        playback.stop();
        assert!(playback.is_finished());
        playback.stop();
    }

    #[test]
    fn test_playback_finishes_when_process_exits() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.mp3");
        std::fs::write(&file, b"x").unwrap();

        let player = SystemPlayer::detect(Some("cat")).unwrap();
        let mut playback = player.play(&file).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !playback.is_finished() {
            assert!(std::time::Instant::now() < deadline, "player never exited");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    #[test]
    fn test_empty_command_is_no_player() {
        assert!(matches!(
            SystemPlayer::detect(Some("   ")),
            Err(PlaybackError::NoPlayer)
        ));
    }
}

#[cfg(test)]
mod fallback_tests {
    use super::*;

    #[test]
    fn test_missing_player_reports_no_player() {
        assert!(matches!(
            MissingPlayer.play(Path::new("a.mp3")),
            Err(PlaybackError::NoPlayer)
        ));
    }
}
