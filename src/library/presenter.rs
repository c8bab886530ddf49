//! Row rendering for the recordings list.

use super::store::RecordingFile;

/// What one list row shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub title: String,
    pub detail: String,
}

impl ListRow {
    pub fn for_file(file: &RecordingFile) -> Self {
        let modified = file
            .modified
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown date".to_string());

        Self {
            title: file.name.clone(),
            detail: format!(
                "{modified}  ·  {}  ·  {}",
                format_size(file.size_bytes),
                file.extension.to_uppercase()
            ),
        }
    }
}

/// Binds files to rows and forwards a row activation to `on_click`.
pub struct ItemPresenter<F> {
    on_click: F,
}

impl<A, F> ItemPresenter<F>
where
    F: Fn(&RecordingFile) -> A,
{
    pub fn new(on_click: F) -> Self {
        Self { on_click }
    }

    pub fn rows(&self, files: &[RecordingFile]) -> Vec<ListRow> {
        files.iter().map(ListRow::for_file).collect()
    }

    /// Runs the click handler for the file at `index`, if there is one.
    pub fn click(&self, files: &[RecordingFile], index: usize) -> Option<A> {
        files.get(index).map(|file| (self.on_click)(file))
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::path::PathBuf;

    fn file(name: &str, size_bytes: u64) -> RecordingFile {
        RecordingFile {
            name: name.to_string(),
            path: PathBuf::from("/recordings").join(name),
            extension: "mp4".to_string(),
            size_bytes,
            modified: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single(),
        }
    }

    #[test]
    fn test_row_shows_file_name_as_title() {
        let row = ListRow::for_file(&file("recording_20240309_140507.mp4", 2048));
        assert_eq!(row.title, "recording_20240309_140507.mp4");
        assert_eq!(row.detail, "2024-03-09 14:05:07  ·  2.0 KB  ·  MP4");
    }

    #[test]
    fn test_click_passes_bound_file() {
        let files = vec![file("a.mp3", 1), file("b.mp3", 2)];
        let presenter = ItemPresenter::new(|f: &RecordingFile| f.name.clone());

        assert_eq!(presenter.click(&files, 1), Some("b.mp3".to_string()));
        assert_eq!(presenter.click(&files, 2), None);
        assert_eq!(presenter.rows(&files).len(), 2);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
