//! Splash screen shown before the dashboard.

use super::screen::Term;
use crossterm::event::{self, Event};
use ratatui::{prelude::*, widgets::Paragraph};
use std::time::{Duration, Instant};

pub const LOGO: &str = "\
╷ ╷┌─┐╷ ╷┌─╴╷  ┌─╴╶┬╴
│╷│├─┤│┌┘├╴ │  ├╴  │
└┴┘╵ ╵└┘ └─╴└─╴└─╴ ╵ ";

const FG: Color = Color::Rgb(206, 224, 220);
const BG: Color = Color::Rgb(0, 0, 0);

/// Shows the logo for `duration`, or until any key is pressed.
///
/// # Errors
/// - If terminal rendering or event polling fails
pub fn show_splash(terminal: &mut Term, duration: Duration) -> anyhow::Result<()> {
    let deadline = Instant::now() + duration;
    tracing::debug!("Splash shown for {}ms", duration.as_millis());

    while Instant::now() < deadline {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Paragraph::new("").style(Style::default().bg(BG)), area);

            let logo_height = LOGO.lines().count() as u16 + 2;
            let logo_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(logo_height) / 2,
                width: area.width,
                height: logo_height.min(area.height),
            };

            let text = format!("{LOGO}\n\nvoice recorder v{}", env!("CARGO_PKG_VERSION"));
            frame.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(FG).bg(BG))
                    .alignment(Alignment::Center),
                logo_area,
            );
        })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if event::poll(remaining.min(Duration::from_millis(100)))? {
            if let Event::Key(_) = event::read()? {
                tracing::debug!("Splash skipped");
                break;
            }
        }
    }

    Ok(())
}
