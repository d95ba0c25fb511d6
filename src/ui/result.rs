use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use super::render_controls;
use crate::app::App;
use crate::view::{Outcome, ReviewEntry, ScoreView};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let quiz = app.quiz();
    let (Some(score), Some(review)) = (quiz.score_view(), quiz.review()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], &score);
    render_question_breakdown(frame, chunks[2], &review, app.review_cursor());
    render_controls(
        frame,
        chunks[3],
        app,
        "j/k move  ·  enter open question  ·  r restart  ·  q quit",
    );
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, score: &ScoreView) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "REVIEW",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.1}%)", score.points, score.max, score.percent),
            Style::default().fg(get_grade_color(score.percent)).bold(),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn outcome_symbol(outcome: Outcome) -> (&'static str, Color) {
    match outcome {
        Outcome::Correct => ("+", Color::Green),
        Outcome::Partial => ("~", Color::Yellow),
        Outcome::Incorrect => ("-", Color::Red),
    }
}

fn join_or_dash(labels: &[String]) -> String {
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, review: &[ReviewEntry], cursor: usize) {
    let lines: Vec<Line> = review
        .iter()
        .map(|entry| {
            let (symbol, color) = outcome_symbol(entry.outcome);
            let text_style = if entry.index == cursor {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", entry.index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(truncate_question(&entry.prompt), text_style),
                Span::styled(
                    format!(
                        "  {}/{}  yours: {}  correct: {}",
                        entry.points,
                        entry.max,
                        join_or_dash(&entry.yours),
                        join_or_dash(&entry.correct)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    // Keep the cursor row on screen.
    let visible = area.height.max(1) as usize;
    let scroll = cursor.saturating_sub(visible.saturating_sub(1));

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");
        let long = "x".repeat(QUESTION_PREVIEW_LENGTH + 5);
        let out = truncate_question(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
    }

    #[test]
    fn test_grade_color() {
        assert_eq!(get_grade_color(95.0), Color::Green);
        assert_eq!(get_grade_color(75.0), Color::Cyan);
        assert_eq!(get_grade_color(50.0), Color::Yellow);
        assert_eq!(get_grade_color(10.0), Color::Red);
    }
}
