use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{ReviewEntry, ScoreBand, TestResult, Verdict};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(result), Some(band)) = (app.result(), app.score_band()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(7), // Score summary
        Constraint::Fill(1),   // Answer review
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], result, band);
    render_review(frame, chunks[1], &result.entries, app.result_scroll());
    render_controls(frame, chunks[2]);
}

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Excellent => Color::Green,
        ScoreBand::Good => Color::Yellow,
        ScoreBand::NeedsImprovement => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, result: &TestResult, band: ScoreBand) {
    let color = band_color(band);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TEST COMPLETED",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{:.0}%", result.score_percent),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} out of {} correct  ·  {}",
                result.correct_count,
                result.total_questions,
                band.label()
            ),
            Style::default().fg(color),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn verdict_style(verdict: Verdict) -> (&'static str, Color) {
    match verdict {
        Verdict::Correct => ("✓", Color::Green),
        Verdict::Incorrect => ("✗", Color::Red),
        Verdict::Unanswered => ("○", Color::DarkGray),
    }
}

fn review_lines(entry: &ReviewEntry) -> Vec<Line<'_>> {
    let (symbol, color) = verdict_style(entry.verdict());
    let answer_style = match entry.verdict() {
        Verdict::Correct => Style::default().fg(Color::Green),
        Verdict::Incorrect => Style::default().fg(Color::Red),
        Verdict::Unanswered => Style::default().fg(Color::DarkGray).italic(),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color).bold()),
            Span::styled(
                format!("Q{}  ", entry.question_no),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(entry.text.as_str(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("     Your Answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(entry.user_answer_label(), answer_style),
            Span::styled("   Correct Answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{}. {}",
                    entry.correct_answer,
                    entry.options[entry.correct_answer.index()]
                ),
                Style::default().fg(Color::Green),
            ),
        ]),
    ];

    if let Some(link) = &entry.solution_link {
        lines.push(Line::from(vec![
            Span::styled("     Solution: ", Style::default().fg(Color::DarkGray)),
            Span::styled(link.as_str(), Style::default().fg(Color::Cyan).underlined()),
        ]));
    }

    lines.push(Line::from(""));
    lines
}

fn render_review(frame: &mut Frame, area: Rect, entries: &[ReviewEntry], scroll: usize) {
    // Scroll is counted in entries; convert to rendered lines.
    let offset: usize = entries
        .iter()
        .take(scroll)
        .map(|entry| review_lines(entry).len())
        .sum();

    let lines: Vec<Line> = entries.iter().flat_map(review_lines).collect();

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Answer Review ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((offset.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
