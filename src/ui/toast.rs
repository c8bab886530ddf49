//! Short-lived notifications shown over the active screen.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

/// Holds at most one toast; a new one replaces the current.
#[derive(Debug)]
pub struct Toaster {
    current: Option<Toast>,
    ttl: Duration,
}

impl Toaster {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(message.into(), ToastKind::Info, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message.into(), ToastKind::Error, Instant::now());
    }

    fn show(&mut self, message: String, kind: ToastKind, now: Instant) {
        tracing::debug!("Toast ({:?}): {}", kind, message);
        self.current = Some(Toast {
            message,
            kind,
            shown_at: now,
        });
    }

    /// The toast to draw at `now`, clearing it once expired.
    pub fn visible(&mut self, now: Instant) -> Option<&Toast> {
        if self
            .current
            .as_ref()
            .is_some_and(|toast| now.saturating_duration_since(toast.shown_at) >= self.ttl)
        {
            self.current = None;
        }
        self.current.as_ref()
    }
}

/// Draws `toast` as a small centered box near the bottom of `area`.
pub fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let width = (toast.message.chars().count() as u16)
        .saturating_add(4)
        .min(area.width);
    let height = 3.min(area.height);

    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height + 2),
        width,
        height,
    };

    let style = match toast.kind {
        ToastKind::Info => Style::default().bg(Color::Green).fg(Color::Black),
        ToastKind::Error => Style::default().bg(Color::Red).fg(Color::White),
    };

    let block = Block::default().borders(Borders::ALL).style(style);
    let inner = block.inner(toast_area);
    frame.render_widget(ratatui::widgets::Clear, toast_area);
    frame.render_widget(&block, toast_area);
    frame.render_widget(
        Paragraph::new(toast.message.as_str())
            .style(style)
            .alignment(Alignment::Center),
        inner,
    );
}
