//! Playback of saved recordings.

pub mod player;

pub use player::{detect_or_missing, Playback, PlayerFactory};
