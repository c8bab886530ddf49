//! Full-screen error display for failures that end a command.

use super::screen::Term;
use crossterm::event::{self, Event};
use ratatui::{prelude::*, widgets::Paragraph};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(255, 0, 0);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Shows `error_message` centered on a red screen until a key is pressed.
///
/// # Errors
/// - If terminal rendering fails
pub fn show_error(terminal: &mut Term, error_message: &str) -> anyhow::Result<()> {
    tracing::error!("{}", error_message.replace('\n', " "));

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(
                Paragraph::new("").style(Style::default().bg(ERROR_BG)),
                area,
            );

            let padding_x = area.width / 10;
            let text_width = (area.width * 80) / 100;
            let lines = error_message.lines().count() as u16;

            let paragraph = Paragraph::new(error_message)
                .style(Style::default().fg(ERROR_FG).bg(ERROR_BG))
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });

            let centered_area = Rect {
                x: area.x + padding_x,
                y: area.y + (area.height.saturating_sub(lines)) / 2,
                width: text_width,
                height: area.height / 2,
            };

            frame.render_widget(paragraph, centered_area);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(_) = event::read()? {
                break;
            }
        }
    }

    Ok(())
}
