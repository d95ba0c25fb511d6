mod chapters;
mod quiz;
mod result;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen() {
        Screen::Chapters => chapters::render(frame, area, app),
        Screen::NoQuestions => chapters::render_empty(frame, area, app),
        Screen::Question => quiz::render(frame, area, app),
        Screen::Review => result::render(frame, area, app),
    }
}

/// Bottom line: the last rejected action if any, otherwise key hints.
fn render_controls(frame: &mut Frame, area: Rect, app: &App, hints: &str) {
    let widget = match app.notice() {
        Some(notice) => Paragraph::new(notice.to_string()).fg(Color::Yellow),
        None => Paragraph::new(hints.to_string()).fg(Color::DarkGray),
    };
    frame.render_widget(widget.alignment(Alignment::Center), area);
}

fn on_off(flag: bool) -> Span<'static> {
    if flag {
        Span::styled("on ", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    }
}
