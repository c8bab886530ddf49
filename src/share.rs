//! Hands a recording to other applications.
//!
//! The desktop counterpart of a "send" action: the file is placed on the
//! clipboard as a `text/uri-list` entry, which file managers, chat clients and
//! mail composers accept as a pasted attachment. Uses pbcopy (macOS), wl-copy
//! (Wayland) or xclip (X11).

use crate::error::ShareError;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

/// Content type announced for shared recordings.
pub const SHARE_MIME: &str = "audio/*";

/// A file reference ready to be handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareHandoff {
    pub path: PathBuf,
    pub uri: String,
    pub mime: &'static str,
}

impl ShareHandoff {
    /// # Errors
    /// - If the file no longer exists
    pub fn for_file(path: &Path) -> Result<Self, ShareError> {
        if !path.is_file() {
            return Err(ShareError::FileMissing(path.to_path_buf()));
        }
        let absolute = path
            .canonicalize()
            .map_err(|e| ShareError::Failed(e.to_string()))?;

        Ok(Self {
            uri: file_uri(&absolute),
            path: absolute,
            mime: SHARE_MIME,
        })
    }
}

/// Builds a `file://` URI with each path segment percent-encoded.
pub fn file_uri(path: &Path) -> String {
    let segments: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => {
                Some(urlencoding::encode(&part.to_string_lossy()).into_owned())
            }
            _ => None,
        })
        .collect();
    format!("file:///{}", segments.join("/"))
}

pub trait ShareTarget {
    fn send(&self, handoff: &ShareHandoff) -> Result<(), ShareError>;
}

/// Shares through the system clipboard.
#[derive(Debug, Default)]
pub struct ClipboardShare;

impl ShareTarget for ClipboardShare {
    fn send(&self, handoff: &ShareHandoff) -> Result<(), ShareError> {
        let payload = format!("{}\r\n", handoff.uri);

        #[cfg(target_os = "macos")]
        {
            if pipe_to("pbcopy", &[], &payload) {
                tracing::info!("Shared {} ({}) via pbcopy", handoff.uri, handoff.mime);
                return Ok(());
            }
        }

        if pipe_to("wl-copy", &["--type", "text/uri-list"], &payload) {
            tracing::info!("Shared {} ({}) via wl-copy", handoff.uri, handoff.mime);
            return Ok(());
        }

        if pipe_to(
            "xclip",
            &["-selection", "clipboard", "-t", "text/uri-list", "-in", "-quiet"],
            &payload,
        ) {
            tracing::info!("Shared {} ({}) via xclip", handoff.uri, handoff.mime);
            return Ok(());
        }

        tracing::warn!("No clipboard tool available for sharing");
        Err(ShareError::NoTarget)
    }
}

/// Writes `text` to the stdin of `program`. Returns false if the tool is
/// missing, the write fails or the tool exits unsuccessfully.
///
/// Tools that keep serving the selection (`xclip -quiet`) are left running
/// and reaped on a background thread once another client takes over.
fn pipe_to(program: &str, args: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        tracing::debug!("{} not found or not executable", program);
        return false;
    };

    let written = match child.stdin.take() {
        Some(mut stdin) => write!(stdin, "{text}"),
        None => Ok(()),
    };
    if let Err(e) = written {
        tracing::warn!("Failed to write to {} stdin: {}", program, e);
        reap(program, child);
        return false;
    }

    // Give the tool time to take ownership of the selection.
    thread::sleep(Duration::from_millis(100));

    match child.try_wait() {
        Ok(Some(status)) if status.success() => true,
        Ok(Some(status)) => {
            tracing::warn!("{} exited with {}", program, status);
            false
        }
        Ok(None) => {
            tracing::debug!("{} keeps serving the selection", program);
            let program = program.to_string();
            thread::spawn(move || match child.wait() {
                Ok(status) => tracing::debug!("{} exited with {}", program, status),
                Err(e) => tracing::warn!("Failed to reap {}: {}", program, e),
            });
            true
        }
        Err(e) => {
            tracing::warn!("Failed to check {} status: {}", program, e);
            reap(program, child);
            false
        }
    }
}

fn reap(program: &str, mut child: Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("{} already exited: {}", program, e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!("Failed to reap {}: {}", program, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_uri_encodes_segments() {
        assert_eq!(
            file_uri(Path::new("/home/me/Music/my memo #1.mp4")),
            "file:///home/me/Music/my%20memo%20%231.mp4"
        );
    }

    #[test]
    fn test_handoff_requires_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.mp4");
        assert!(matches!(
            ShareHandoff::for_file(&missing),
            Err(ShareError::FileMissing(_))
        ));
    }

    #[test]
    fn test_handoff_is_typed_as_audio() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memo.mp4");
        std::fs::write(&path, b"x").unwrap();

        let handoff = ShareHandoff::for_file(&path).unwrap();
        assert_eq!(handoff.mime, "audio/*");
        assert!(handoff.uri.starts_with("file:///"));
        assert!(handoff.uri.ends_with("/memo.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_reports_tool_outcome() {
        assert!(pipe_to("cat", &[], "file:///tmp/memo.mp4\r\n"));
        assert!(pipe_to("sh", &["-c", "cat >/dev/null; sleep 1"], "x"));
        assert!(!pipe_to("false", &[], "x"));
        assert!(!pipe_to("wavelet-no-such-clipboard-tool", &[], "x"));
    }
}
