//! wavelet: a terminal voice recorder.

mod app;
mod commands;
mod config;
mod error;
mod library;
mod logging;
mod permissions;
mod playback;
mod recording;
mod setup;
mod share;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
