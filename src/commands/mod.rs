//! Application command handlers for wavelet.
//!
//! # Commands
//! - `record`: splash, dashboard and recordings list (default)
//! - `recordings`: interactive list plus `ls`, `play`, `rename`, `delete`, `share`
//! - `config`: open the configuration file in the user's editor
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod config;
pub mod context;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod recordings;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use recordings::{
    handle_delete, handle_list, handle_ls, handle_play, handle_rename, handle_share,
};
