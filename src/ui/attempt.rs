use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::engine::{format_hms, AttemptStatus, GridCell};
use crate::models::{OptionKey, Question};

const SIDEBAR_WIDTH: u16 = 32;
const GRID_COLUMNS: usize = 6;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(12),   // Question and sidebar
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app);

    let body = Layout::horizontal([Constraint::Min(30), Constraint::Length(SIDEBAR_WIDTH)])
        .split(chunks[1]);
    render_question_panel(frame, body[0], app);
    render_sidebar(frame, body[1], app);

    render_controls(frame, chunks[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let countdown = session.countdown();

    let timer_style = if countdown.is_warning() {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::Green).bold()
    };

    let columns = Layout::horizontal([Constraint::Min(20), Constraint::Length(14)]).split(area);

    let title = vec![
        Line::from(Span::styled(
            session.mock_test_name(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "Question {} of {}",
                app.navigator().current() + 1,
                app.navigator().len()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(title), columns[0]);

    let timer = Paragraph::new(format_hms(countdown.remaining()))
        .alignment(Alignment::Center)
        .style(timer_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(timer_style),
        );
    frame.render_widget(timer, columns[1]);
}

fn render_question_panel(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6), // Question text
        Constraint::Min(10),   // Options
    ])
    .split(area);

    render_question_text(frame, chunks[0], question);
    render_options(frame, chunks[1], question, app.current_answer());
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question) {
    let widget = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Q{} ", question.question_no))
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, question: &Question, selected: Option<OptionKey>) {
    let mut lines: Vec<Line> = Vec::with_capacity(OptionKey::ALL.len() * 2);

    for option in OptionKey::ALL {
        let is_selected = selected == Some(option);
        let style = if is_selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { "(*)" } else { "( )" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option), style),
            Span::styled(question.option_text(option), style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Min(5),    // Grid
        Constraint::Length(5), // Summary
        Constraint::Length(3), // Submit
    ])
    .split(area);

    render_grid(frame, chunks[0], &app.grid());
    render_summary(frame, chunks[1], app);
    render_submit(frame, chunks[2], app.status());
}

fn render_grid(frame: &mut Frame, area: Rect, cells: &[GridCell]) {
    let lines: Vec<Line> = cells
        .chunks(GRID_COLUMNS)
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| {
                    let mut style = if cell.answered {
                        Style::default().fg(Color::Black).bg(Color::Green)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    if cell.current {
                        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                    }
                    Span::styled(format!("{:>3} ", cell.question_no), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Questions ")
            .title_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(widget, area);
}

fn render_summary(frame: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();
    let row = |label: &'static str, value: usize, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<18}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), Style::default().fg(color).bold()),
        ])
    };

    let widget = Paragraph::new(vec![
        row("Total Questions:", summary.total, Color::White),
        row("Answered:", summary.answered, Color::Green),
        row("Remaining:", summary.remaining, Color::Yellow),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_submit(frame: &mut Frame, area: Rect, status: AttemptStatus) {
    let (label, color) = if status == AttemptStatus::Submitting {
        ("Submitting...", Color::DarkGray)
    } else {
        ("[S] Submit Test", Color::Cyan)
    };

    let widget = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let widget = match app.jump_input() {
        Some(input) => Paragraph::new(format!("Go to question: {}_  ·  Enter jump  ·  Esc cancel", input))
            .alignment(Alignment::Center)
            .fg(Color::Yellow),
        None => Paragraph::new("a-d answer  ·  h/l or arrows move  ·  g jump  ·  s submit  ·  q quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray),
    };

    frame.render_widget(widget, area);
}
