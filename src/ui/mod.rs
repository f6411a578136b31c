mod attempt;
mod result;
mod status;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::engine::AttemptStatus;
use crate::notification::NotificationKind;

const NOTIFICATION_WIDTH: u16 = 48;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.status() {
        AttemptStatus::Loading => status::render_loading(frame, area),
        AttemptStatus::InProgress | AttemptStatus::Submitting => attempt::render(frame, area, app),
        AttemptStatus::Completed => result::render(frame, area, app),
        AttemptStatus::Failed => status::render_failed(frame, area, app),
    }

    render_notification(frame, area, app);
}

fn render_notification(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notification) = app.notification() else {
        return;
    };

    let color = match notification.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Info => Color::Cyan,
    };

    let width = NOTIFICATION_WIDTH.min(area.width);
    let toast = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y,
        width,
        height: 4.min(area.height),
    };

    let widget = Paragraph::new(notification.message.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(Clear, toast);
    frame.render_widget(widget, toast);
}
