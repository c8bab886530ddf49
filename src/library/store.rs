//! Recordings folder access: listing, naming, rename and delete.

use crate::error::StoreError;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions shown in the recordings list (compared case-insensitively).
pub const AUDIO_EXTENSIONS: [&str; 4] = ["m4a", "3gp", "mp3", "mp4"];

/// Extension appended to user-chosen names that lack it.
pub const RENAME_EXTENSION: &str = "mp3";

const RECORDING_PREFIX: &str = "recording_";

/// An audio file in the recordings folder. Identity is the path.
#[derive(Debug, Clone)]
pub struct RecordingFile {
    pub name: String,
    pub path: PathBuf,
    pub extension: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
}

impl PartialEq for RecordingFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for RecordingFile {}

impl RecordingFile {
    /// Reads metadata for `path`. Returns `None` for non-audio files and
    /// anything that is not a regular file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let extension = audio_extension(&name)?;
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        Some(Self {
            name,
            path: path.to_path_buf(),
            extension,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Returns the extension of `name` if it is on the audio allow-list.
fn audio_extension(name: &str) -> Option<String> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    AUDIO_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        .then(|| extension.to_string())
}

/// File name for a capture started at `timestamp`: `recording_yyyyMMdd_HHmmss.<ext>`.
pub fn recording_file_name(timestamp: DateTime<Local>, extension: &str) -> String {
    format!(
        "{RECORDING_PREFIX}{}.{extension}",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Validates a user-supplied name and appends the rename extension if missing.
///
/// The extension check ignores ASCII case, so "bar.MP3" is kept as is rather
/// than becoming "bar.MP3.mp3".
pub fn normalize_new_name(input: &str) -> Result<String, StoreError> {
    let name = input.trim();
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(StoreError::InvalidName(input.to_string()));
    }

    let suffix = format!(".{RENAME_EXTENSION}");
    let has_extension = name
        .get(name.len().saturating_sub(suffix.len())..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(&suffix));

    if has_extension {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{suffix}"))
    }
}

/// The fixed recordings folder.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Lists audio files, newest first by modification time, then by name.
    ///
    /// A missing folder is an empty list.
    pub fn list(&self) -> Result<Vec<RecordingFile>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::ListFailed(e)),
        };

        let mut recordings: Vec<RecordingFile> = entries
            .filter_map(|entry| {
                let entry = entry.ok()?;
                RecordingFile::from_path(&entry.path())
            })
            .collect();

        recordings.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));

        tracing::debug!(
            "Found {} recordings in {}",
            recordings.len(),
            self.dir.display()
        );
        Ok(recordings)
    }

    /// Path for a new capture. Adds a counter when a file for the same second
    /// already exists.
    pub fn next_recording_path(&self, now: DateTime<Local>, extension: &str) -> PathBuf {
        let candidate = self.dir.join(recording_file_name(now, extension));
        if !candidate.exists() {
            return candidate;
        }

        let stem = format!("{RECORDING_PREFIX}{}", now.format("%Y%m%d_%H%M%S"));
        (1..)
            .map(|n| self.dir.join(format!("{stem}_{n}.{extension}")))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }

    /// Finds a recording by file name, or by a path that points into the
    /// folder. Anything outside the folder is `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<RecordingFile, StoreError> {
        let given = Path::new(name);
        let not_found = || StoreError::NotFound(given.to_path_buf());

        let file_name = given.file_name().ok_or_else(not_found)?;
        let has_parent = given.parent().is_some_and(|p| !p.as_os_str().is_empty());
        if has_parent && !self.contains(&self.dir.join(given)) {
            tracing::warn!("Refusing path outside recordings folder: {}", given.display());
            return Err(not_found());
        }

        let path = self.dir.join(file_name);
        RecordingFile::from_path(&path).ok_or(StoreError::NotFound(path))
    }

    /// True when `path` names an entry directly inside the folder.
    fn contains(&self, path: &Path) -> bool {
        match (path.canonicalize(), self.dir.canonicalize()) {
            (Ok(path), Ok(dir)) => path.parent() == Some(dir.as_path()),
            _ => false,
        }
    }

    pub fn delete(&self, file: &RecordingFile) -> Result<(), StoreError> {
        if !file.exists() {
            return Err(StoreError::NotFound(file.path.clone()));
        }
        fs::remove_file(&file.path).map_err(StoreError::DeleteFailed)?;
        tracing::info!("Deleted recording: {}", file.path.display());
        Ok(())
    }

    /// Renames `file` within its folder and returns the updated entry.
    pub fn rename(&self, file: &RecordingFile, new_name: &str) -> Result<RecordingFile, StoreError> {
        let new_name = normalize_new_name(new_name)?;
        if !file.exists() {
            return Err(StoreError::NotFound(file.path.clone()));
        }

        let parent = file.path.parent().unwrap_or(&self.dir);
        let target = parent.join(&new_name);
        if target == file.path {
            return Ok(file.clone());
        }
        if target.exists() {
            return Err(StoreError::AlreadyExists(new_name));
        }

        fs::rename(&file.path, &target).map_err(StoreError::RenameFailed)?;
        tracing::info!(
            "Renamed recording: {} -> {}",
            file.path.display(),
            target.display()
        );

        RecordingFile::from_path(&target).ok_or(StoreError::NotFound(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    fn touch(store: &FileStore, name: &str) -> PathBuf {
        let path = store.dir().join(name);
        fs::write(&path, b"audio").unwrap();
        path
    }

    fn names(files: &[RecordingFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_list_filters_by_extension_case_insensitively() {
        let (store, _temp_dir) = create_test_store();
        touch(&store, "a.m4a");
        touch(&store, "b.txt");
        touch(&store, "c.MP4");

        let mut listed = names(&store.list().unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        listed.sort();
        assert_eq!(listed, vec!["a.m4a", "c.MP4"]);
    }

    #[test]
    fn test_list_skips_directories_and_dotfiles() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir(store.dir().join("nested.mp3")).unwrap();
        touch(&store, ".mp3");
        touch(&store, "keep.3gp");

        assert_eq!(names(&store.list().unwrap()), vec!["keep.3gp"]);
    }

    #[test]
    fn test_list_of_missing_folder_is_empty() {
        let (store, _temp_dir) = create_test_store();
        let missing = FileStore::new(store.dir().join("nope"));
        assert!(missing.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_orders_by_name_when_times_tie() {
        let (store, _temp_dir) = create_test_store();
        let stamp = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        for name in ["b.mp3", "a.mp3", "c.mp3"] {
            let path = touch(&store, name);
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(stamp)
                .unwrap();
        }

        assert_eq!(names(&store.list().unwrap()), vec!["a.mp3", "b.mp3", "c.mp3"]);
    }

    #[test]
    fn test_list_puts_newest_first() {
        let (store, _temp_dir) = create_test_store();
        let base = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        for (offset, name) in [(0, "old.mp4"), (60, "new.mp4"), (30, "mid.mp4")] {
            let path = touch(&store, name);
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(base + std::time::Duration::from_secs(offset))
                .unwrap();
        }

        assert_eq!(names(&store.list().unwrap()), vec!["new.mp4", "mid.mp4", "old.mp4"]);
    }

    #[test]
    fn test_recording_file_name_format() {
        let ts = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(recording_file_name(ts, "mp4"), "recording_20240307_090501.mp4");
    }

    #[test]
    fn test_next_recording_path_avoids_collisions() {
        let (store, _temp_dir) = create_test_store();
        let ts = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();

        let first = store.next_recording_path(ts, "mp4");
        fs::write(&first, b"x").unwrap();
        let second = store.next_recording_path(ts, "mp4");

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "recording_20240307_090501_1.mp4"
        );
    }

    #[test]
    fn test_normalize_new_name() {
        assert_eq!(normalize_new_name("bar").unwrap(), "bar.mp3");
        assert_eq!(normalize_new_name("bar.mp3").unwrap(), "bar.mp3");
        assert_eq!(normalize_new_name("  bar.MP3 ").unwrap(), "bar.MP3");
        assert_eq!(normalize_new_name("bar.m4a").unwrap(), "bar.m4a.mp3");
        assert!(normalize_new_name("   ").is_err());
        assert!(normalize_new_name("../escape").is_err());
    }

    #[test]
    fn test_normalize_new_name_with_multibyte_characters() {
        assert_eq!(normalize_new_name("ñabc").unwrap(), "ñabc.mp3");
        assert_eq!(normalize_new_name("日本").unwrap(), "日本.mp3");
        assert_eq!(normalize_new_name("café").unwrap(), "café.mp3");
        assert_eq!(normalize_new_name("café.MP3").unwrap(), "café.MP3");
        assert_eq!(normalize_new_name("ü.mp3").unwrap(), "ü.mp3");
    }

    #[test]
    fn test_rename_to_non_ascii_name() {
        let (store, _temp_dir) = create_test_store();
        let path = touch(&store, "foo.mp4");
        let file = RecordingFile::from_path(&path).unwrap();

        let renamed = store.rename(&file, "日本").unwrap();
        assert_eq!(renamed.name, "日本.mp3");
        assert!(store.dir().join("日本.mp3").exists());
    }

    #[test]
    fn test_rename_appends_extension() {
        let (store, _temp_dir) = create_test_store();
        let path = touch(&store, "foo.mp4");
        let file = RecordingFile::from_path(&path).unwrap();

        let renamed = store.rename(&file, "bar").unwrap();
        assert_eq!(renamed.name, "bar.mp3");
        assert!(!path.exists());
        assert!(store.dir().join("bar.mp3").exists());

        let again = store.rename(&renamed, "baz.mp3").unwrap();
        assert_eq!(again.name, "baz.mp3");
    }

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let (store, _temp_dir) = create_test_store();
        let path = touch(&store, "foo.mp4");
        touch(&store, "bar.mp3");
        let file = RecordingFile::from_path(&path).unwrap();

        assert!(matches!(
            store.rename(&file, "bar"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(path.exists());
    }

    #[test]
    fn test_delete_missing_file_fails() {
        let (store, _temp_dir) = create_test_store();
        let path = touch(&store, "gone.mp3");
        let file = RecordingFile::from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(matches!(store.delete(&file), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_resolve_by_name() {
        let (store, _temp_dir) = create_test_store();
        touch(&store, "memo.m4a");

        assert_eq!(store.resolve("memo.m4a").unwrap().name, "memo.m4a");
        assert!(store.resolve("other.m4a").is_err());

        let full = store.dir().join("memo.m4a");
        assert_eq!(store.resolve(&full.to_string_lossy()).unwrap().name, "memo.m4a");
    }

    #[test]
    fn test_resolve_rejects_paths_outside_folder() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("Recordings"));
        store.ensure_dir().unwrap();
        let outside = temp_dir.path().join("secret.mp3");
        fs::write(&outside, b"audio").unwrap();

        let absolute = store.resolve(&outside.to_string_lossy());
        assert!(matches!(absolute, Err(StoreError::NotFound(_))));

        let relative = store.resolve("../secret.mp3");
        assert!(matches!(relative, Err(StoreError::NotFound(_))));

        assert!(matches!(store.resolve(".."), Err(StoreError::NotFound(_))));
        assert!(outside.exists());
    }
}
