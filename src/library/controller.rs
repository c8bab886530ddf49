//! Recordings list controller.
//!
//! Owns the snapshot of the recordings folder and the single active playback.
//! Starting a playback releases the previous one first.

use super::store::{FileStore, RecordingFile};
use crate::error::{PlaybackError, ShareError, StoreError};
use crate::playback::{Playback, PlayerFactory};
use crate::share::{ShareHandoff, ShareTarget};
use std::path::{Path, PathBuf};

pub struct ListController {
    store: FileStore,
    players: Box<dyn PlayerFactory>,
    share_target: Box<dyn ShareTarget>,
    snapshot: Vec<RecordingFile>,
    playback: Option<Box<dyn Playback>>,
    /// Folder entry behind `playback`. Follows renames.
    playing: Option<PathBuf>,
}

impl ListController {
    /// Creates the controller and loads the initial snapshot.
    ///
    /// # Errors
    /// - If the recordings folder exists but cannot be read
    pub fn new(
        store: FileStore,
        players: Box<dyn PlayerFactory>,
        share_target: Box<dyn ShareTarget>,
    ) -> Result<Self, StoreError> {
        let snapshot = store.list()?;
        Ok(Self {
            store,
            players,
            share_target,
            snapshot,
            playback: None,
            playing: None,
        })
    }

    /// The snapshot as of the last (re)load.
    pub fn recordings(&self) -> &[RecordingFile] {
        &self.snapshot
    }

    /// Reads the folder without touching the snapshot.
    pub fn list_recordings(&self) -> Result<Vec<RecordingFile>, StoreError> {
        self.store.list()
    }

    /// Replaces the snapshot with the current folder contents.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.snapshot = self.store.list()?;
        Ok(())
    }

    /// Plays `file`, stopping whatever was playing.
    ///
    /// # Errors
    /// - If the file is gone or no player can be started
    pub fn play(&mut self, file: &RecordingFile) -> Result<(), PlaybackError> {
        self.release_playback();

        if !file.exists() {
            return Err(PlaybackError::FileMissing(file.path.clone()));
        }
        self.playback = Some(self.players.play(&file.path)?);
        self.playing = Some(file.path.clone());
        Ok(())
    }

    /// Current path of the entry held by the player, finished or not.
    pub fn now_playing(&self) -> Option<&Path> {
        self.playing.as_deref()
    }

    /// True while audio is still coming out.
    pub fn is_playing(&mut self) -> bool {
        self.playback
            .as_mut()
            .is_some_and(|playback| !playback.is_finished())
    }

    /// Stops and drops the active playback, if any.
    pub fn release_playback(&mut self) {
        self.playing = None;
        if let Some(mut playback) = self.playback.take() {
            playback.stop();
            tracing::debug!("Playback released: {}", playback.path().display());
        }
    }

    /// Deletes `file`, stopping it first if it is the one playing.
    ///
    /// The snapshot only changes when the delete succeeds.
    pub fn delete(&mut self, file: &RecordingFile) -> Result<(), StoreError> {
        if self.now_playing() == Some(file.path.as_path()) {
            self.release_playback();
        }

        self.store.delete(file)?;
        self.snapshot.retain(|entry| entry != file);
        Ok(())
    }

    /// Renames `file` and updates its snapshot entry in place.
    pub fn rename(&mut self, file: &RecordingFile, new_name: &str) -> Result<RecordingFile, StoreError> {
        let renamed = self.store.rename(file, new_name)?;
        if self.now_playing() == Some(file.path.as_path()) {
            self.playing = Some(renamed.path.clone());
        }
        if let Some(entry) = self.snapshot.iter_mut().find(|entry| *entry == file) {
            *entry = renamed.clone();
        }
        Ok(renamed)
    }

    /// Hands `file` to other applications.
    ///
    /// # Errors
    /// - If the file no longer exists
    /// - If no share target is available
    pub fn share(&self, file: &RecordingFile) -> Result<ShareHandoff, ShareError> {
        let handoff = ShareHandoff::for_file(&file.path)?;
        self.share_target.send(&handoff)?;
        Ok(handoff)
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.release_playback();
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use crate::error::{PlaybackError, ShareError};
    use crate::playback::{Playback, PlayerFactory};
    use crate::share::{ShareHandoff, ShareTarget};
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    #[derive(Debug, Default)]
    pub struct PlayLog {
        pub started: Vec<PathBuf>,
        pub stopped: Vec<PathBuf>,
        pub active: usize,
        pub max_active: usize,
    }

    pub struct FakePlayback {
        log: Rc<RefCell<PlayLog>>,
        path: PathBuf,
        stopped: bool,
        pub finished: bool,
    }

    impl Playback for FakePlayback {
        fn path(&self) -> &Path {
            &self.path
        }

        fn is_finished(&mut self) -> bool {
            self.finished || self.stopped
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                let mut log = self.log.borrow_mut();
                log.active -= 1;
                log.stopped.push(self.path.clone());
            }
        }
    }

    impl Drop for FakePlayback {
        fn drop(&mut self) {
            self.stop();
        }
    }

    pub struct FakePlayer {
        pub log: Rc<RefCell<PlayLog>>,
    }

    impl FakePlayer {
        pub fn new() -> (Self, Rc<RefCell<PlayLog>>) {
            let log = Rc::new(RefCell::new(PlayLog::default()));
            (Self { log: log.clone() }, log)
        }
    }

    impl PlayerFactory for FakePlayer {
        fn play(&self, path: &Path) -> Result<Box<dyn Playback>, PlaybackError> {
            let mut log = self.log.borrow_mut();
            log.started.push(path.to_path_buf());
            log.active += 1;
            log.max_active = log.max_active.max(log.active);
            Ok(Box::new(FakePlayback {
                log: self.log.clone(),
                path: path.to_path_buf(),
                stopped: false,
                finished: false,
            }))
        }
    }

    #[derive(Default)]
    pub struct FakeShare {
        pub sent: Rc<RefCell<Vec<ShareHandoff>>>,
    }

    impl ShareTarget for FakeShare {
        fn send(&self, handoff: &ShareHandoff) -> Result<(), ShareError> {
            self.sent.borrow_mut().push(handoff.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakePlayer, FakeShare, PlayLog};
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn create_controller(files: &[&str]) -> (ListController, Rc<RefCell<PlayLog>>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        for name in files {
            fs::write(temp_dir.path().join(name), b"audio").unwrap();
        }
        let (player, log) = FakePlayer::new();
        let controller = ListController::new(
            FileStore::new(temp_dir.path().to_path_buf()),
            Box::new(player),
            Box::new(FakeShare::default()),
        )
        .unwrap();
        (controller, log, temp_dir)
    }

    fn find(controller: &ListController, name: &str) -> RecordingFile {
        controller
            .recordings()
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_snapshot_loaded_on_creation() {
        let (controller, _log, _temp_dir) = create_controller(&["a.m4a", "b.txt", "c.MP4"]);
        let mut names: Vec<_> = controller.recordings().iter().map(|f| f.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["a.m4a", "c.MP4"]);
    }

    #[test]
    fn test_play_replaces_previous_playback() {
        let (mut controller, log, _temp_dir) = create_controller(&["a.mp3", "b.mp3"]);
        let a = find(&controller, "a.mp3");
        let b = find(&controller, "b.mp3");

        controller.play(&a).unwrap();
        controller.play(&b).unwrap();

        let log = log.borrow();
        assert_eq!(log.max_active, 1);
        assert_eq!(log.active, 1);
        assert_eq!(log.stopped, vec![a.path.clone()]);
        assert_eq!(controller.now_playing(), Some(b.path.as_path()));
    }

    #[test]
    fn test_delete_playing_file_stops_playback_first() {
        let (mut controller, log, _temp_dir) = create_controller(&["a.mp3", "b.mp3"]);
        let a = find(&controller, "a.mp3");

        controller.play(&a).unwrap();
        controller.delete(&a).unwrap();

        assert_eq!(log.borrow().active, 0);
        assert!(controller.now_playing().is_none());
        assert!(!a.path.exists());
        assert!(controller.recordings().iter().all(|f| f.name != "a.mp3"));
        assert!(controller
            .list_recordings()
            .unwrap()
            .iter()
            .all(|f| f.name != "a.mp3"));
    }

    #[test]
    fn test_delete_after_rename_stops_playback_first() {
        let (mut controller, log, _temp_dir) = create_controller(&["foo.mp4"]);
        let foo = find(&controller, "foo.mp4");

        controller.play(&foo).unwrap();
        let bar = controller.rename(&foo, "bar").unwrap();
        assert_eq!(controller.now_playing(), Some(bar.path.as_path()));

        controller.delete(&bar).unwrap();

        assert_eq!(log.borrow().active, 0);
        assert_eq!(log.borrow().stopped, vec![foo.path.clone()]);
        assert!(controller.now_playing().is_none());
        assert!(!bar.path.exists());
    }

    #[test]
    fn test_rename_of_other_file_keeps_playing_entry() {
        let (mut controller, _log, _temp_dir) = create_controller(&["a.mp3", "b.mp3"]);
        let a = find(&controller, "a.mp3");
        let b = find(&controller, "b.mp3");

        controller.play(&a).unwrap();
        controller.rename(&b, "c").unwrap();

        assert_eq!(controller.now_playing(), Some(a.path.as_path()));
    }

    #[test]
    fn test_delete_other_file_keeps_playback() {
        let (mut controller, log, _temp_dir) = create_controller(&["a.mp3", "b.mp3"]);
        let a = find(&controller, "a.mp3");
        let b = find(&controller, "b.mp3");

        controller.play(&a).unwrap();
        controller.delete(&b).unwrap();

        assert_eq!(log.borrow().active, 1);
        assert_eq!(controller.recordings().len(), 1);
    }

    #[test]
    fn test_failed_delete_leaves_snapshot() {
        let (mut controller, _log, _temp_dir) = create_controller(&["a.mp3"]);
        let a = find(&controller, "a.mp3");
        fs::remove_file(&a.path).unwrap();

        assert!(controller.delete(&a).is_err());
        assert_eq!(controller.recordings().len(), 1);
    }

    #[test]
    fn test_rename_updates_snapshot_in_place() {
        let (mut controller, _log, _temp_dir) = create_controller(&["foo.mp4"]);
        let foo = find(&controller, "foo.mp4");

        let renamed = controller.rename(&foo, "bar").unwrap();
        assert_eq!(renamed.name, "bar.mp3");
        assert_eq!(controller.recordings().len(), 1);
        assert_eq!(controller.recordings()[0].name, "bar.mp3");

        let again = controller.rename(&renamed, "bar.mp3").unwrap();
        assert_eq!(again.name, "bar.mp3");
    }

    #[test]
    fn test_failed_rename_leaves_snapshot() {
        let (mut controller, _log, _temp_dir) = create_controller(&["foo.mp4"]);
        let foo = find(&controller, "foo.mp4");

        assert!(controller.rename(&foo, "  ").is_err());
        assert_eq!(controller.recordings()[0].name, "foo.mp4");
    }

    #[test]
    fn test_share_missing_file_fails() {
        let (controller, _log, _temp_dir) = create_controller(&["a.mp3"]);
        let a = find(&controller, "a.mp3");
        fs::remove_file(&a.path).unwrap();

        assert!(matches!(controller.share(&a), Err(ShareError::FileMissing(_))));
    }

    #[test]
    fn test_share_sends_audio_handoff() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.mp3"), b"audio").unwrap();
        let share = FakeShare::default();
        let sent = share.sent.clone();
        let (player, _log) = FakePlayer::new();
        let controller = ListController::new(
            FileStore::new(temp_dir.path().to_path_buf()),
            Box::new(player),
            Box::new(share),
        )
        .unwrap();

        let a = find(&controller, "a.mp3");
        controller.share(&a).unwrap();

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].mime, "audio/*");
    }

    #[test]
    fn test_refresh_picks_up_new_files() {
        let (mut controller, _log, temp_dir) = create_controller(&["a.mp3"]);
        fs::write(temp_dir.path().join("b.3gp"), b"audio").unwrap();
        assert_eq!(controller.recordings().len(), 1);

        controller.refresh().unwrap();
        assert_eq!(controller.recordings().len(), 2);
    }

    #[test]
    fn test_drop_releases_playback() {
        let (mut controller, log, _temp_dir) = create_controller(&["a.mp3"]);
        let a = find(&controller, "a.mp3");
        controller.play(&a).unwrap();

        drop(controller);
        assert_eq!(log.borrow().active, 0);
    }
}
