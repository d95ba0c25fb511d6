use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use super::{on_off, render_controls};
use crate::app::App;
use crate::models::{Judgment, ScoringMode};
use crate::session::SessionState;
use crate::view::{ChoiceView, Feedback, OptionView, QuestionView, Verdict};

const IN_PROGRESS_HINTS: &str =
    "j/k move  ·  space choose  ·  h/l prev/next  ·  s submit  ·  o/p shuffle/practice  ·  q quit";
const JUDGMENT_HINTS: &str =
    "j/k move  ·  c correct  ·  x wrong  ·  u undecided  ·  h/l prev/next  ·  s submit  ·  q quit";
const SUBMITTED_HINTS: &str = "h/l prev/next  ·  v review  ·  r restart  ·  q quit";

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let quiz = app.quiz();
    let Some(view) = quiz.current_view() else {
        return;
    };

    let has_image = view.image.is_some();
    let has_footer = view.feedback.is_some() || view.comment.is_some();

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Length(if has_image { 1 } else { 0 }),
        Constraint::Fill(1),
        Constraint::Length(if has_footer { 3 } else { 0 }),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app);
    render_meta(frame, chunks[1], &view);
    render_question_text(frame, chunks[2], &view);
    if let Some(image) = &view.image {
        render_image_ref(frame, chunks[3], image);
    }
    render_options(frame, chunks[4], &view.options, app.option_cursor());
    render_footer(frame, chunks[5], &view);

    let hints = match quiz.state() {
        SessionState::Submitted => SUBMITTED_HINTS,
        _ => match quiz.settings().scoring {
            ScoringMode::Judgment => JUDGMENT_HINTS,
            ScoringMode::Selection => IN_PROGRESS_HINTS,
        },
    };
    render_controls(frame, chunks[6], app, hints);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let quiz = app.quiz();
    let Some(progress) = quiz.progress() else {
        return;
    };

    let mut spans = vec![Span::styled(
        format!(
            "{} {}/{} {}  ·  answered {}",
            if quiz.is_first() { " " } else { "◀" },
            progress.step,
            progress.total,
            if quiz.is_last() { " " } else { "▶" },
            progress.answered
        ),
        Style::default().fg(Color::DarkGray),
    )];

    if let Some(score) = quiz.score_view() {
        spans.push(Span::styled(
            format!(
                "  ·  score {}/{} ({:.1}%)",
                score.points, score.max, score.percent
            ),
            Style::default().fg(Color::Cyan).bold(),
        ));
    } else {
        spans.push(Span::styled(
            "  ·  practice ",
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(on_off(quiz.settings().practice));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        area,
    );
}

fn render_meta(frame: &mut Frame, area: Rect, view: &QuestionView) {
    if let Some(meta) = &view.meta {
        frame.render_widget(Paragraph::new(meta.as_str()).fg(Color::DarkGray), area);
    }
}

fn render_question_text(frame: &mut Frame, area: Rect, view: &QuestionView) {
    let text = format!("{}) {}", view.index + 1, view.prompt);
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_image_ref(frame: &mut Frame, area: Rect, image: &str) {
    let widget = Paragraph::new(format!("[image: {}]", image)).fg(Color::Yellow);
    frame.render_widget(widget, area);
}

fn choice_marker(choice: ChoiceView) -> &'static str {
    match choice {
        ChoiceView::Selected(true) => "[x]",
        ChoiceView::Selected(false) => "[ ]",
        ChoiceView::Judged(Judgment::MarkedCorrect) => "[✓]",
        ChoiceView::Judged(Judgment::MarkedWrong) => "[✗]",
        ChoiceView::Judged(Judgment::Undecided) => "[?]",
    }
}

fn verdict_badge(verdict: Option<Verdict>) -> (&'static str, Color) {
    match verdict {
        Some(Verdict::Right) => ("  correct", Color::Green),
        Some(Verdict::Wrong) => ("  wrong", Color::Red),
        Some(Verdict::Missed) => ("  missed", Color::Yellow),
        None => ("", Color::Reset),
    }
}

fn render_options(frame: &mut Frame, area: Rect, options: &[OptionView], cursor: usize) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == cursor;
        let style = if is_cursor {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_cursor { ">" } else { " " };
        let (badge, badge_color) = verdict_badge(option.verdict);

        let mut spans = vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{} ", choice_marker(option.choice)), style),
            Span::styled(format!("{}. ", option.label), style),
            Span::styled(option.text.as_str(), style),
        ];
        if let Some(image) = &option.image {
            spans.push(Span::styled(
                format!(" [image: {}]", image),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(badge, Style::default().fg(badge_color).bold()));

        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn feedback_line(feedback: &Feedback) -> Line<'static> {
    if feedback.correct {
        Line::from(Span::styled(
            "Correct",
            Style::default().fg(Color::Green).bold(),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "Not quite ({}/{}). Correct: {}",
                feedback.points,
                feedback.max,
                feedback.correct_labels.join(", ")
            ),
            Style::default().fg(Color::Red).bold(),
        ))
    }
}

fn render_footer(frame: &mut Frame, area: Rect, view: &QuestionView) {
    let mut lines = Vec::new();
    if let Some(feedback) = &view.feedback {
        lines.push(feedback_line(feedback));
    }
    if let Some(comment) = &view.comment {
        lines.push(Line::from(comment.as_str().fg(Color::Gray).italic()));
    }
    if lines.is_empty() {
        return;
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
