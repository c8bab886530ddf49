//! Recording: capture engine, session state machine, timer and dashboard.

pub mod audio;
pub mod engine;
pub mod ffmpeg;
pub mod meter;
pub mod session;
pub mod timer;
pub mod ui;

pub use audio::CpalCaptureFactory;
pub use session::{SessionController, SessionState, Transition};
pub use ui::{Dashboard, DashboardCommand};
