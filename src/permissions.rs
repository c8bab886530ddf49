//! Microphone and storage capability checks.
//!
//! Run before a recording starts; a denied capability blocks the start
//! transition instead of letting the capture engine fail later.

use crate::recording::audio::resolve_input_device;
use std::fs;
use std::path::PathBuf;

/// Outcome of checking one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    Granted,
    Denied(String),
}

/// Capabilities needed to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permissions {
    pub microphone: Grant,
    pub storage: Grant,
}

impl Permissions {
    #[cfg(test)]
    pub fn all_granted() -> Self {
        Self {
            microphone: Grant::Granted,
            storage: Grant::Granted,
        }
    }

    /// Human-readable reason for the first denied capability, if any.
    pub fn denied_reason(&self) -> Option<String> {
        [&self.microphone, &self.storage]
            .into_iter()
            .find_map(|grant| match grant {
                Grant::Denied(reason) => Some(reason.clone()),
                Grant::Granted => None,
            })
    }
}

pub trait PermissionProbe {
    fn check(&self) -> Permissions;
}

/// Probes the real input device and recordings folder.
pub struct SystemProbe {
    device: String,
    recordings_dir: PathBuf,
}

impl SystemProbe {
    pub fn new(device: String, recordings_dir: PathBuf) -> Self {
        Self {
            device,
            recordings_dir,
        }
    }

    fn check_microphone(&self) -> Grant {
        match resolve_input_device(&self.device) {
            Ok(_) => Grant::Granted,
            Err(e) => Grant::Denied(e.to_string()),
        }
    }

    fn check_storage(&self) -> Grant {
        if let Err(e) = fs::create_dir_all(&self.recordings_dir) {
            return Grant::Denied(format!(
                "cannot create {}: {e}",
                self.recordings_dir.display()
            ));
        }

        let probe_path = self.recordings_dir.join(".wavelet-write-probe");
        match fs::write(&probe_path, b"") {
            Ok(()) => {
                if let Err(e) = fs::remove_file(&probe_path) {
                    tracing::debug!("Failed to remove write probe: {}", e);
                }
                Grant::Granted
            }
            Err(e) => Grant::Denied(format!(
                "cannot write to {}: {e}",
                self.recordings_dir.display()
            )),
        }
    }
}

impl PermissionProbe for SystemProbe {
    fn check(&self) -> Permissions {
        let permissions = Permissions {
            microphone: self.check_microphone(),
            storage: self.check_storage(),
        };
        tracing::debug!("Permission probe: {:?}", permissions);
        permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_reason_reports_first_denial() {
        let permissions = Permissions {
            microphone: Grant::Denied("no mic".to_string()),
            storage: Grant::Denied("read-only".to_string()),
        };
        assert_eq!(permissions.denied_reason().as_deref(), Some("no mic"));
        let granted = Permissions {
            microphone: Grant::Granted,
            storage: Grant::Granted,
        };
        assert_eq!(granted.denied_reason(), None);
    }

    #[test]
    fn test_storage_probe_leaves_no_file_behind() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().join("Recordings");
        let probe = SystemProbe::new("default".to_string(), dir.clone());

        assert_eq!(probe.check_storage(), Grant::Granted);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
