use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use super::{on_off, render_controls};
use crate::app::App;
use crate::models::ScoringMode;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], app);
    render_chapter_list(frame, chunks[1], app);
    render_settings(frame, chunks[2], app);
    render_controls(
        frame,
        chunks[3],
        app,
        "j/k move  ·  space toggle  ·  a all  ·  n none  ·  enter start  ·  q quit",
    );
}

/// Bank size line, with the rejected count when records were dropped.
fn bank_summary(app: &App) -> Line<'static> {
    let bank = app.quiz().bank();
    let mut spans = vec![Span::styled(
        format!(
            "{} questions · {} chapters",
            bank.len(),
            app.quiz().chapters().len()
        ),
        Style::default().fg(Color::DarkGray),
    )];

    let rejected = bank.diagnostics().len();
    if rejected > 0 {
        spans.push(Span::styled(
            format!(" · {} rejected (run --check)", rejected),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let content = vec![
        Line::from(Span::styled(
            "CHAPTER QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        bank_summary(app),
    ];
    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        area,
    );
}

fn render_chapter_list(frame: &mut Frame, area: Rect, app: &App) {
    let quiz = app.quiz();
    let lines: Vec<Line> = quiz
        .chapters()
        .iter()
        .enumerate()
        .map(|(index, &key)| {
            let is_cursor = index == app.chapter_cursor();
            let style = if is_cursor {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_cursor { ">" } else { " " };
            let check = if quiz.is_chapter_selected(key) {
                "[x]"
            } else {
                "[ ]"
            };

            Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(format!("{} ", check), style),
                Span::styled(key.to_string(), style),
            ])
        })
        .collect();

    let lines = if lines.is_empty() {
        vec![Line::from(
            "No question in this bank has a chapter.".fg(Color::Yellow),
        )]
    } else {
        lines
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(" Chapters ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let settings = app.quiz().settings();
    let scoring = match settings.scoring {
        ScoringMode::Selection => "select correct options",
        ScoringMode::Judgment => "judge every option",
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(" m  scoring            "),
            Span::styled(scoring, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw(" s  shuffle questions  "),
            on_off(settings.shuffle_questions),
        ]),
        Line::from(vec![
            Span::raw(" o  shuffle options    "),
            on_off(settings.shuffle_options),
        ]),
        Line::from(vec![
            Span::raw(" p  practice mode      "),
            on_off(settings.practice),
        ]),
    ];

    let widget = Paragraph::new(lines).fg(Color::Gray).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray)
            .title(" Settings "),
    );
    frame.render_widget(widget, area);
}

/// Shown when a start found nothing to ask.
pub fn render_empty(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ])
    .split(area);

    let reason = app
        .empty_selection()
        .map(ToString::to_string)
        .unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No questions found",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(Span::styled(reason, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("back to chapters".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_bank;
    use crate::session::QuizController;
    use crate::settings::Settings;

    fn app_for(json: &str) -> App {
        App::new(QuizController::new(
            parse_bank(json).unwrap(),
            Settings::default(),
        ))
    }

    #[test]
    fn test_summary_reports_rejected_records() {
        let app = app_for(
            r#"[
                {"id": "1.1", "question": "?", "options": {"A": "x"}, "correct": ["A"]},
                {"id": "1.2", "question": "?", "options": {"A": "x"}, "correct": ["Z"]},
                {"id": "2.1", "question": "?", "options": {}, "correct": []}
            ]"#,
        );
        assert_eq!(
            bank_summary(&app).to_string(),
            "1 questions · 1 chapters · 2 rejected (run --check)"
        );
    }

    #[test]
    fn test_summary_of_clean_bank() {
        let app = app_for(
            r#"[{"id": "1.1", "question": "?", "options": {"A": "x"}, "correct": ["A"]}]"#,
        );
        assert_eq!(bank_summary(&app).to_string(), "1 questions · 1 chapters");
    }
}
