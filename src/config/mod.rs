//! Configuration management for wavelet.
//!
//! Loads application settings from a TOML file in the user's config
//! directory.

pub mod file;

pub use file::{config_path, WaveletConfig};
