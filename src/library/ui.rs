//! Interactive recordings list.
//!
//! A scrollable list of saved recordings with keyboard and mouse support.
//! Activating a row opens the playback dialog, which offers replay, delete,
//! rename and share.

use super::controller::ListController;
use super::dialog::{action_for_key, DialogAction, DialogLayout, DismissReason, PlaybackDialog};
use super::presenter::ItemPresenter;
use super::store::RecordingFile;
use crate::ui::{render_toast, Term, Toaster};
use anyhow::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DETAIL_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);
const ACCENT: Color = Color::Rgb(206, 224, 220);

/// Lines per list row: file name and detail.
const ROW_HEIGHT: u16 = 2;

const HEADER: &str = " ╷ ╷┌─┐╷ ╷\n │╷│├─┤│┌┘\n └┴┘╵ ╵└┘ ";

/// Why the viewer returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerExit {
    /// Back to the screen that opened the list.
    Back,
    /// Leave the application.
    Quit,
}

pub struct RecordingsViewer {
    list_state: ListState,
    dialog: Option<PlaybackDialog>,
    toaster: Toaster,
    frame_area: Rect,
    list_area: Rect,
}

impl RecordingsViewer {
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            list_state: ListState::default(),
            dialog: None,
            toaster: Toaster::new(toast_ttl),
            frame_area: Rect::default(),
            list_area: Rect::default(),
        }
    }

    /// Runs the list until the user navigates away.
    ///
    /// An open playback dialog is dismissed, and its player released, on
    /// every exit path including errors.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn run(&mut self, terminal: &mut Term, controller: &mut ListController) -> Result<ViewerExit> {
        if let Err(e) = controller.refresh() {
            self.toaster.error(format!("Could not read recordings: {e}"));
        }
        self.clamp_selection(controller.recordings().len());
        tracing::debug!(
            "Recordings viewer started with {} entries",
            controller.recordings().len()
        );

        let result = self.event_loop(terminal, controller);

        if let Some(dialog) = self.dialog.take() {
            dialog.dismiss(controller, DismissReason::ScreenExit);
        }
        tracing::debug!("Recordings viewer closed: {:?}", result);
        result
    }

    fn event_loop(&mut self, terminal: &mut Term, controller: &mut ListController) -> Result<ViewerExit> {
        loop {
            self.draw(terminal, controller)?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(exit) = self.handle_key(controller, key) {
                            return Ok(exit);
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(controller, mouse),
                    _ => {}
                }
            }
        }
    }

    fn handle_key(&mut self, controller: &mut ListController, key: KeyEvent) -> Option<ViewerExit> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(ViewerExit::Quit);
        }

        if let Some(dialog) = self.dialog.as_mut() {
            if dialog.rename_input().is_some() {
                self.handle_rename_key(controller, key);
            } else if let Some(action) = action_for_key(key) {
                self.apply(controller, action);
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => {
                tracing::debug!("Recordings viewer exited via back navigation");
                return Some(ViewerExit::Back);
            }
            KeyCode::Up => self.list_state.select_previous(),
            KeyCode::Down => self.list_state.select_next(),
            KeyCode::Enter | KeyCode::Right => {
                if let Some(index) = self.list_state.selected() {
                    self.open(controller, index);
                }
            }
            KeyCode::F(5) | KeyCode::Char('R') => {
                match controller.refresh() {
                    Ok(()) => self.toaster.info("Refreshed"),
                    Err(e) => self.toaster.error(format!("Could not read recordings: {e}")),
                }
                self.clamp_selection(controller.recordings().len());
            }
            _ => {}
        }
        None
    }

    fn handle_rename_key(&mut self, controller: &mut ListController, key: KeyEvent) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Enter => {
                let Some(new_name) = dialog.take_rename() else {
                    return;
                };
                let file = dialog.file().clone();
                match controller.rename(&file, &new_name) {
                    Ok(renamed) => {
                        self.toaster.info(format!("Renamed to {}", renamed.name));
                        dialog.set_file(renamed);
                    }
                    Err(e) => {
                        tracing::warn!("Rename of {} failed: {}", file.name, e);
                        self.toaster.error(format!("Rename failed: {e}"));
                    }
                }
            }
            KeyCode::Esc => {
                dialog.take_rename();
            }
            _ => {
                if let Some(input) = dialog.rename_input_mut() {
                    input.handle_event(&Event::Key(key));
                }
            }
        }
    }

    fn handle_mouse(&mut self, controller: &mut ListController, mouse: MouseEvent) {
        if self.dialog.is_some() {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                let layout = DialogLayout::compute(self.frame_area);
                if let Some(action) = layout.action_at(mouse.column, mouse.row) {
                    self.apply(controller, action);
                }
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => self.list_state.select_previous(),
            MouseEventKind::ScrollDown => self.list_state.select_next(),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.row_at(mouse.column, mouse.row) {
                    if index < controller.recordings().len() {
                        self.list_state.select(Some(index));
                        self.open(controller, index);
                    }
                }
            }
            _ => {}
        }
    }

    /// List index under a screen position, based on the last drawn frame.
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = Block::default().borders(Borders::ALL).inner(self.list_area);
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let offset = usize::from((row - inner.y) / ROW_HEIGHT);
        Some(self.list_state.offset() + offset)
    }

    fn open(&mut self, controller: &mut ListController, index: usize) {
        let presenter = ItemPresenter::new(|file: &RecordingFile| file.clone());
        let Some(file) = presenter.click(controller.recordings(), index) else {
            return;
        };

        match PlaybackDialog::open(controller, file) {
            Ok(dialog) => self.dialog = Some(dialog),
            Err(e) => {
                tracing::warn!("Playback failed: {}", e);
                self.toaster.error(format!("Cannot play: {e}"));
            }
        }
    }

    fn apply(&mut self, controller: &mut ListController, action: DialogAction) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        let file = dialog.file().clone();

        match action {
            DialogAction::Dismiss(reason) => {
                if let Some(dialog) = self.dialog.take() {
                    dialog.dismiss(controller, reason);
                }
            }
            DialogAction::Rename => dialog.begin_rename(),
            DialogAction::Replay => {
                if let Err(e) = controller.play(&file) {
                    tracing::warn!("Replay of {} failed: {}", file.name, e);
                    self.toaster.error(format!("Cannot play: {e}"));
                }
            }
            DialogAction::Share => match controller.share(&file) {
                Ok(_) => self.toaster.info(format!("{} copied for sharing", file.name)),
                Err(e) => {
                    tracing::warn!("Share of {} failed: {}", file.name, e);
                    self.toaster.error(format!("Share failed: {e}"));
                }
            },
            DialogAction::Delete => match controller.delete(&file) {
                Ok(()) => {
                    self.toaster.info(format!("Deleted {}", file.name));
                    if let Some(dialog) = self.dialog.take() {
                        dialog.dismiss(controller, DismissReason::ItemDeleted);
                    }
                    self.clamp_selection(controller.recordings().len());
                }
                Err(e) => {
                    tracing::warn!("Delete of {} failed: {}", file.name, e);
                    self.toaster.error(format!("Delete failed: {e}"));
                }
            },
        }
    }

    fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
        } else {
            let index = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(index));
        }
    }

    fn draw(&mut self, terminal: &mut Term, controller: &mut ListController) -> Result<()> {
        let presenter = ItemPresenter::new(|_: &RecordingFile| ());
        let rows = presenter.rows(controller.recordings());
        let playing = controller.is_playing();
        let toast = self.toaster.visible(Instant::now()).cloned();
        let dialog = self.dialog.as_ref();
        let list_state = &mut self.list_state;
        let mut frame_area = Rect::default();
        let mut list_area = Rect::default();

        terminal.draw(|frame| {
            let area = frame.area();
            frame_area = area;

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, body_area, footer_area] = Layout::vertical([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(padded_area);
            list_area = body_area;

            frame.render_widget(
                Paragraph::new(HEADER).style(Style::default().fg(FG)),
                header_area,
            );

            let block = Block::default()
                .title(format!(" Recordings ({}) ", rows.len()))
                .borders(Borders::ALL)
                .style(Style::default().fg(FG).bg(BG));

            if rows.is_empty() {
                frame.render_widget(
                    Paragraph::new("\nNo recordings yet.")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(DETAIL_FG))
                        .block(block),
                    body_area,
                );
            } else {
                let items: Vec<ListItem> = rows
                    .iter()
                    .map(|row| {
                        ListItem::new(vec![
                            Line::styled(row.title.clone(), Style::default().fg(FG)),
                            Line::styled(row.detail.clone(), Style::default().fg(DETAIL_FG)),
                        ])
                    })
                    .collect();

                let list = List::new(items)
                    .block(block)
                    .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                    .highlight_symbol("> ")
                    .highlight_spacing(HighlightSpacing::Always);
                frame.render_stateful_widget(list, body_area, list_state);
            }

            let help_text = match dialog {
                Some(d) if d.rename_input().is_some() => "↵ save name, esc cancel",
                Some(_) => "↵ replay, d delete, r rename, s share, esc close",
                None => "↑↓ select, ↵ play, F5 refresh, esc back",
            };
            frame.render_widget(
                Paragraph::new(help_text)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(HELP_FG)),
                footer_area,
            );

            if let Some(dialog) = dialog {
                render_dialog(frame, area, dialog, playing);
            }

            if let Some(toast) = &toast {
                render_toast(frame, area, toast);
            }
        })?;

        self.frame_area = frame_area;
        self.list_area = list_area;
        Ok(())
    }
}

fn render_dialog(frame: &mut Frame, area: Rect, dialog: &PlaybackDialog, playing: bool) {
    let layout = DialogLayout::compute(area);
    let block = Block::default()
        .title(" Playback ")
        .borders(Borders::ALL)
        .style(Style::default().fg(FG).bg(BG));
    frame.render_widget(Clear, layout.outer);
    frame.render_widget(block, layout.outer);

    let file = dialog.file();
    frame.render_widget(
        Paragraph::new(file.name.as_str()).style(Style::default().fg(ACCENT).bold()),
        layout.title,
    );

    let status = if playing { "▶ playing" } else { "■ finished" };
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(DETAIL_FG)),
        layout.status,
    );

    if let Some(input) = dialog.rename_input() {
        let label = "name: ";
        let value = format!("{label}{}", input.value());
        frame.render_widget(
            Paragraph::new(value).style(Style::default().fg(FG).bg(HIGHLIGHT_BG)),
            layout.input,
        );
        let cursor_x = layout.input.x + (label.len() + input.visual_cursor()) as u16;
        frame.set_cursor_position(Position::new(
            cursor_x.min(layout.input.right().saturating_sub(1)),
            layout.input.y,
        ));
    }

    for (rect, (label, _)) in layout.buttons.iter().map(|(rect, _)| rect).zip(super::dialog::BUTTONS) {
        frame.render_widget(
            Paragraph::new(format!(" {label} "))
                .style(Style::default().fg(BG).bg(ACCENT)),
            *rect,
        );
    }
}
