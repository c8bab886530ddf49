//! Recording dashboard.
//!
//! Shows a scrolling level meter, the session timer and a state indicator,
//! and maps keys onto session commands.

use super::meter::{level_percent, LevelHistory};
use super::session::{SessionController, SessionState, Transition};
use super::timer::Clock;
use crate::ui::{render_toast, Term, Toaster};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Sparkline},
};
use std::time::{Duration, Instant};

const BG: Color = Color::Rgb(0, 0, 0);
const WAVE_FG: Color = Color::Rgb(206, 224, 220);
const MIRROR_BG: Color = Color::Rgb(185, 207, 212);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// How often a new level is pushed into the history.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// Enough samples for a 50 ms window at 96 kHz.
const METER_WINDOW: usize = 4800;

/// What a key press asks the dashboard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    Continue,
    /// Start when idle, resume when paused.
    Record,
    Pause,
    Stop,
    OpenList,
    Quit,
}

/// One key, one command. Space toggles between pause and resume.
pub fn command_for_key(key: KeyEvent, state: SessionState) -> DashboardCommand {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            DashboardCommand::Quit
        }
        KeyCode::Enter | KeyCode::Char('r') => DashboardCommand::Record,
        KeyCode::Char(' ') => match state {
            SessionState::Recording => DashboardCommand::Pause,
            SessionState::Paused | SessionState::Idle => DashboardCommand::Record,
        },
        KeyCode::Char('p') => DashboardCommand::Pause,
        KeyCode::Char('s') => DashboardCommand::Stop,
        KeyCode::Char('l') | KeyCode::Tab => DashboardCommand::OpenList,
        KeyCode::Char('q') | KeyCode::Esc => DashboardCommand::Quit,
        _ => DashboardCommand::Continue,
    }
}

pub struct Dashboard {
    history: LevelHistory,
    reference_level_db: i8,
    last_sample_time: Instant,
    last_level: u8,
    toaster: Toaster,
}

impl Dashboard {
    pub fn new(reference_level_db: i8, toast_ttl: Duration) -> Self {
        Self {
            history: LevelHistory::default(),
            reference_level_db,
            last_sample_time: Instant::now(),
            last_level: 0,
            toaster: Toaster::new(toast_ttl),
        }
    }

    pub fn toaster(&mut self) -> &mut Toaster {
        &mut self.toaster
    }

    /// Waits briefly for a key and maps it to a command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn poll_command(&self, state: SessionState) -> anyhow::Result<DashboardCommand> {
        if event::poll(SAMPLE_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                let command = command_for_key(key, state);
                if command != DashboardCommand::Continue {
                    tracing::debug!("Key {:?} -> {:?}", key.code, command);
                }
                return Ok(command);
            }
        }
        Ok(DashboardCommand::Continue)
    }

    /// Runs a session command and reports the outcome as a toast.
    ///
    /// Session errors end here; the dashboard keeps running.
    pub fn apply<C: Clock>(&mut self, session: &mut SessionController<C>, command: DashboardCommand) {
        let result = match command {
            DashboardCommand::Record => session.record(),
            DashboardCommand::Pause => session.pause(),
            DashboardCommand::Stop => session.stop(),
            DashboardCommand::Continue | DashboardCommand::OpenList | DashboardCommand::Quit => {
                return;
            }
        };

        match result {
            Ok(Transition::Started(_)) => {
                self.history.clear();
                self.toaster.info("Recording started");
            }
            Ok(Transition::Paused) => self.toaster.info("Paused"),
            Ok(Transition::Resumed) => self.toaster.info("Resumed"),
            Ok(Transition::Stopped(path)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.toaster.info(format!("Saved {name}"));
            }
            Ok(Transition::Ignored) => {
                if command == DashboardCommand::Pause && session.state() == SessionState::Recording {
                    self.toaster.info("Pause is not supported by this device");
                }
            }
            Err(e) => {
                tracing::warn!("{:?} failed: {}", command, e);
                self.toaster.error(e.to_string());
            }
        }
    }

    fn sample_level<C: Clock>(&mut self, session: &SessionController<C>, width: usize) {
        self.history.resize(width);
        if session.state() != SessionState::Recording {
            self.last_level = 0;
            return;
        }
        if self.last_sample_time.elapsed() < SAMPLE_INTERVAL {
            return;
        }

        let (samples, sample_rate) = session.recent_samples(METER_WINDOW);
        self.last_level = level_percent(&samples, sample_rate, self.reference_level_db);
        self.history.push(self.last_level, width);
        self.last_sample_time = Instant::now();
    }

    /// Draws the meter, timer, indicator and any toast.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw<C: Clock>(&mut self, terminal: &mut Term, session: &SessionController<C>) -> anyhow::Result<()> {
        let width = terminal.size()?.width as usize;
        self.sample_level(session, width);

        let state = session.state();
        let can_pause = session.can_pause();
        let display = session.display().to_string();
        let target = match (session.output_path(), session.started_at()) {
            (Some(path), Some(started)) => format!(
                "   {} (since {})",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                started.format("%H:%M:%S")
            ),
            _ => String::new(),
        };
        let level = self.last_level;
        let toast = self.toaster.visible(Instant::now()).cloned();
        let history = self.history.values();

        terminal.draw(|frame| {
            let area = frame.area();
            let [meter_area, status_area, help_area] = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

            let top_height = meter_area.height / 3 * 2;
            let [top_area, bottom_area] =
                Layout::vertical([Constraint::Length(top_height), Constraint::Min(0)])
                    .areas(meter_area);

            frame.render_widget(
                Sparkline::default()
                    .data(history)
                    .max(80)
                    .style(Style::default().bg(BG).fg(WAVE_FG)),
                top_area,
            );

            let mirrored: Vec<u64> = history.iter().map(|&v| 100_u64.saturating_sub(v)).collect();
            frame.render_widget(
                Sparkline::default()
                    .data(&mirrored)
                    .max(80)
                    .style(Style::default().bg(MIRROR_BG).fg(BG)),
                bottom_area,
            );

            let indicator = match state {
                SessionState::Recording => Span::styled("● ", Style::default().fg(Color::Red)),
                SessionState::Paused => Span::styled("⏸ ", Style::default().fg(Color::Yellow)),
                SessionState::Idle => Span::styled("■ ", Style::default().fg(HELP_FG)),
            };
            let status = Line::from(vec![
                indicator,
                Span::raw(display),
                Span::raw(" / "),
                Span::raw(format!("{level}%")),
                Span::styled(target, Style::default().fg(HELP_FG)),
            ]);
            frame.render_widget(
                Paragraph::new(status).style(Style::default().fg(MIRROR_BG).bg(BG)),
                status_area,
            );

            let help = match state {
                SessionState::Idle => "↵ record, l recordings, q quit",
                SessionState::Recording if can_pause => "space pause, s stop, l recordings, q save & quit",
                SessionState::Recording => "s stop, l recordings, q save & quit",
                SessionState::Paused => "space resume, s stop, l recordings, q save & quit",
            };
            frame.render_widget(
                Paragraph::new(help)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(HELP_FG).bg(BG)),
                help_area,
            );

            if let Some(toast) = &toast {
                render_toast(frame, area, toast);
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::FileStore;
    use crate::recording::session::fakes::{CaptureLog, FakeFactory, FixedProbe};
    use crate::recording::timer::test_clock::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn create_session(
        probe: FixedProbe,
    ) -> (SessionController<ManualClock>, Rc<RefCell<CaptureLog>>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let (factory, log) = FakeFactory::new();
        let session = SessionController::with_clock(
            FileStore::new(temp_dir.path().to_path_buf()),
            Box::new(factory),
            Box::new(probe),
            ManualClock::new(),
        );
        (session, log, temp_dir)
    }

    fn toast_message(dashboard: &mut Dashboard) -> Option<String> {
        dashboard
            .toaster()
            .visible(Instant::now())
            .map(|t| t.message.clone())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_space_toggles_by_state() {
        let space = key(KeyCode::Char(' '));
        assert_eq!(command_for_key(space, SessionState::Recording), DashboardCommand::Pause);
        assert_eq!(command_for_key(space, SessionState::Paused), DashboardCommand::Record);
        assert_eq!(command_for_key(key(KeyCode::Char('s')), SessionState::Idle), DashboardCommand::Stop);
        assert_eq!(command_for_key(key(KeyCode::Esc), SessionState::Idle), DashboardCommand::Quit);
        assert_eq!(
            command_for_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                SessionState::Recording
            ),
            DashboardCommand::Quit
        );
    }

    #[test]
    fn test_record_then_stop_reports_saved_file() {
        let (mut session, log, _temp_dir) = create_session(FixedProbe::granted());
        let mut dashboard = Dashboard::new(-20, Duration::from_secs(5));

        dashboard.apply(&mut session, DashboardCommand::Record);
        assert_eq!(session.state(), SessionState::Recording);
        assert_eq!(toast_message(&mut dashboard).as_deref(), Some("Recording started"));

        dashboard.apply(&mut session, DashboardCommand::Stop);
        assert_eq!(session.state(), SessionState::Idle);
        let message = toast_message(&mut dashboard).unwrap();
        assert!(message.starts_with("Saved recording_"), "{message}");
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn test_permission_denial_becomes_error_toast() {
        let (mut session, log, _temp_dir) = create_session(FixedProbe::no_microphone());
        let mut dashboard = Dashboard::new(-20, Duration::from_secs(5));

        dashboard.apply(&mut session, DashboardCommand::Record);

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(log.borrow().opens, 0);
        let toast = dashboard.toaster().visible(Instant::now()).cloned().unwrap();
        assert_eq!(toast.kind, crate::ui::toast::ToastKind::Error);
    }

    #[test]
    fn test_pause_unsupported_is_explained() {
        let (mut session, log, _temp_dir) = create_session(FixedProbe::granted());
        log.borrow_mut().pause_supported = false;
        let mut dashboard = Dashboard::new(-20, Duration::from_secs(5));

        dashboard.apply(&mut session, DashboardCommand::Record);
        dashboard.apply(&mut session, DashboardCommand::Pause);

        assert_eq!(session.state(), SessionState::Recording);
        assert_eq!(log.borrow().pauses, 0);
        assert_eq!(
            toast_message(&mut dashboard).as_deref(),
            Some("Pause is not supported by this device")
        );
    }

    #[test]
    fn test_stop_while_idle_is_silent() {
        let (mut session, _log, _temp_dir) = create_session(FixedProbe::granted());
        let mut dashboard = Dashboard::new(-20, Duration::from_secs(5));

        dashboard.apply(&mut session, DashboardCommand::Stop);
        assert!(toast_message(&mut dashboard).is_none());
    }
}
