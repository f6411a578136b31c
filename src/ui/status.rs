use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::App;

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "MANTRA IAS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Starting test...",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];

    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        centered(area, 7),
    );
}

pub fn render_failed(frame: &mut Frame, area: Rect, app: &App) {
    let message = app.failure().unwrap_or("Failed to load test");

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "MANTRA IAS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press [Q] to go back",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        centered(area, 9),
    );
}

fn centered(area: Rect, height: u16) -> Rect {
    Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(height),
        Constraint::Percentage(40),
    ])
    .split(area)[1]
}
