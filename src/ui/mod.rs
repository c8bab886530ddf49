//! Screens and widgets shared across commands.

pub mod error;
pub mod screen;
pub mod splash;
pub mod toast;

pub use error::show_error;
pub use screen::{Screen, Term};
pub use splash::show_splash;
pub use toast::{render_toast, Toaster};
