//! Interactive recorder: splash, dashboard and the recordings list.
//!
//! The dashboard and list share one terminal session. A recording keeps
//! running while the list is open. SIGUSR1 toggles recording from outside
//! the terminal (start when idle, save when active).

use super::context::AppContext;
use crate::library::{ListController, RecordingsViewer, ViewerExit};
use crate::recording::timer::format_elapsed;
use crate::recording::{Dashboard, DashboardCommand, SessionController, SessionState, Transition};
use crate::ui::{show_error, show_splash, Screen, Term};
use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs the recorder until the user quits. An active recording is saved on
/// the way out.
///
/// # Errors
/// - If the terminal cannot be initialized or drawn
/// - If the configuration cannot be loaded
pub async fn handle_record(with_splash: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavelet recorder started ===");

    let mut screen = Screen::enter()?;

    let context = match AppContext::load() {
        Ok(context) => context,
        Err(err) => {
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavelet/wavelet.toml file and try again."
            );
            show_error(screen.terminal(), &error_message)?;
            screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    let mut library = match context.list_controller() {
        Ok(library) => library,
        Err(err) => {
            show_error(screen.terminal(), &format!("Recordings Error:\n\n{err}"))?;
            screen.cleanup()?;
            return Err(err);
        }
    };

    let ui = &context.config.ui;
    if with_splash && ui.splash_ms > 0 {
        show_splash(screen.terminal(), ui.splash_duration())?;
    }

    let mut session = context.session();
    let mut dashboard = Dashboard::new(context.config.audio.reference_level_db, ui.toast_duration());
    let mut viewer = RecordingsViewer::new(ui.toast_duration());

    if let Some(reason) = session.check_permissions().denied_reason() {
        tracing::warn!("Permission check at startup: {}", reason);
        dashboard.toaster().error(reason);
    }

    let toggle = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, toggle.clone())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let result = run_dashboard(
        screen.terminal(),
        &mut session,
        &mut library,
        &mut dashboard,
        &mut viewer,
        &toggle,
    );

    let saved = save_on_exit(&mut session);
    drop(library);
    screen.cleanup()?;

    if let Some(path) = saved {
        println!("Saved {}", path.display());
    }

    tracing::info!("=== wavelet recorder exited ===");
    result
}

fn run_dashboard(
    terminal: &mut Term,
    session: &mut SessionController,
    library: &mut ListController,
    dashboard: &mut Dashboard,
    viewer: &mut RecordingsViewer,
    toggle: &AtomicBool,
) -> anyhow::Result<()> {
    tracing::debug!("Entering dashboard loop");

    loop {
        if toggle.swap(false, Ordering::Relaxed) {
            let command = match session.state() {
                SessionState::Idle => DashboardCommand::Record,
                SessionState::Recording | SessionState::Paused => DashboardCommand::Stop,
            };
            tracing::info!("Received SIGUSR1: {:?}", command);
            dashboard.apply(session, command);
        }

        session.poll_tick();
        dashboard.draw(terminal, session)?;

        match dashboard.poll_command(session.state())? {
            DashboardCommand::Continue => {}
            DashboardCommand::Quit => return Ok(()),
            DashboardCommand::OpenList => {
                let exit = viewer.run(terminal, library)?;
                if exit == ViewerExit::Quit {
                    return Ok(());
                }
                terminal.clear()?;
            }
            command => dashboard.apply(session, command),
        }
    }
}

/// Stops an active session and returns the saved file.
fn save_on_exit(session: &mut SessionController) -> Option<PathBuf> {
    if session.state() == SessionState::Idle {
        return None;
    }
    let length = format_elapsed(session.elapsed());
    match session.stop() {
        Ok(Transition::Stopped(path)) => {
            tracing::info!("Saved on exit after {}: {}", length, path.display());
            Some(path)
        }
        Ok(_) => None,
        Err(e) => {
            tracing::error!("Failed to save recording on exit: {}", e);
            eprintln!("Error: {e}");
            None
        }
    }
}
