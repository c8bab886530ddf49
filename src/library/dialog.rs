//! Playback dialog shown over the recordings list.
//!
//! Opening the dialog starts playback; every way of closing it goes through
//! [`PlaybackDialog::dismiss`], which releases the player.

use super::controller::ListController;
use super::store::RecordingFile;
use crate::error::PlaybackError;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};
use tui_input::Input;

/// How the dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseButton,
    OutsideClick,
    BackNavigation,
    ScreenExit,
    ItemDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Dismiss(DismissReason),
    Delete,
    Rename,
    Share,
    Replay,
}

/// Clickable buttons, left to right, with their labels.
pub const BUTTONS: [(&str, DialogAction); 5] = [
    ("▶ play", DialogAction::Replay),
    ("d delete", DialogAction::Delete),
    ("r rename", DialogAction::Rename),
    ("s share", DialogAction::Share),
    ("x close", DialogAction::Dismiss(DismissReason::CloseButton)),
];

const DIALOG_WIDTH: u16 = 64;
const DIALOG_HEIGHT: u16 = 9;
const BUTTON_GAP: u16 = 2;

/// Screen geometry of the dialog, shared by drawing and hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogLayout {
    pub outer: Rect,
    pub title: Rect,
    pub status: Rect,
    pub input: Rect,
    pub buttons: Vec<(Rect, DialogAction)>,
}

impl DialogLayout {
    /// Centers the dialog in `area`.
    pub fn compute(area: Rect) -> Self {
        let width = DIALOG_WIDTH.min(area.width);
        let height = DIALOG_HEIGHT.min(area.height);
        let outer = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        let inner_x = outer.x + 2;
        let inner_width = outer.width.saturating_sub(4);
        let row = |offset: u16| Rect {
            x: inner_x,
            y: outer.y + offset,
            width: inner_width,
            height: 1,
        };

        let total: u16 = BUTTONS
            .iter()
            .map(|(label, _)| label.chars().count() as u16 + 2)
            .sum::<u16>()
            + BUTTON_GAP * (BUTTONS.len() as u16 - 1);
        let button_y = outer.y + outer.height.saturating_sub(2);
        let mut x = outer.x + outer.width.saturating_sub(total) / 2;

        let buttons = BUTTONS
            .iter()
            .map(|(label, action)| {
                let width = label.chars().count() as u16 + 2;
                let rect = Rect {
                    x,
                    y: button_y,
                    width,
                    height: 1,
                };
                x += width + BUTTON_GAP;
                (rect.intersection(outer), *action)
            })
            .collect();

        Self {
            outer,
            title: row(1),
            status: row(3),
            input: row(5),
            buttons,
        }
    }

    /// Maps a left click to an action. Clicks outside the dialog dismiss it.
    pub fn action_at(&self, column: u16, row: u16) -> Option<DialogAction> {
        let position = Position::new(column, row);
        if !self.outer.contains(position) {
            return Some(DialogAction::Dismiss(DismissReason::OutsideClick));
        }
        self.buttons
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, action)| *action)
    }
}

/// Maps a key press to an action while the rename prompt is closed.
pub fn action_for_key(key: KeyEvent) -> Option<DialogAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('q') => {
            Some(DialogAction::Dismiss(DismissReason::BackNavigation))
        }
        KeyCode::Char('x') => Some(DialogAction::Dismiss(DismissReason::CloseButton)),
        KeyCode::Char('d') | KeyCode::Delete => Some(DialogAction::Delete),
        KeyCode::Char('r') => Some(DialogAction::Rename),
        KeyCode::Char('s') => Some(DialogAction::Share),
        KeyCode::Enter | KeyCode::Char(' ') => Some(DialogAction::Replay),
        _ => None,
    }
}

pub struct PlaybackDialog {
    file: RecordingFile,
    rename: Option<Input>,
}

impl PlaybackDialog {
    /// Opens the dialog for `file` and starts playing it.
    ///
    /// # Errors
    /// - If playback cannot start; nothing stays acquired in that case
    pub fn open(controller: &mut ListController, file: RecordingFile) -> Result<Self, PlaybackError> {
        controller.play(&file)?;
        tracing::debug!("Playback dialog opened for {}", file.name);
        Ok(Self { file, rename: None })
    }

    pub fn file(&self) -> &RecordingFile {
        &self.file
    }

    /// Points the dialog at the renamed file. The running playback is left as is.
    pub fn set_file(&mut self, file: RecordingFile) {
        self.file = file;
    }

    pub fn rename_input(&self) -> Option<&Input> {
        self.rename.as_ref()
    }

    pub fn rename_input_mut(&mut self) -> Option<&mut Input> {
        self.rename.as_mut()
    }

    /// Opens the rename prompt prefilled with the current name.
    pub fn begin_rename(&mut self) {
        self.rename = Some(Input::new(self.file.name.clone()));
    }

    /// Closes the rename prompt and returns what was typed.
    pub fn take_rename(&mut self) -> Option<String> {
        self.rename.take().map(|input| input.value().to_string())
    }

    /// Closes the dialog and releases the player.
    pub fn dismiss(self, controller: &mut ListController, reason: DismissReason) {
        controller.release_playback();
        tracing::debug!("Playback dialog for {} dismissed: {:?}", self.file.name, reason);
    }
}
