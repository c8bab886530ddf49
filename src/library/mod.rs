//! Saved recordings: the folder, its list screen and the playback dialog.

pub mod controller;
pub mod dialog;
pub mod presenter;
pub mod store;
pub mod ui;

pub use controller::ListController;
pub use store::{FileStore, RecordingFile};
pub use ui::{RecordingsViewer, ViewerExit};
