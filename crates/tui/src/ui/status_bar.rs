use {
    super::theme::Theme,
    crate::state::{AppState, ConnectionDisplay, InputMode, NoticeLevel},
    ratatui::{
        Frame,
        layout::{Constraint, Layout, Rect},
        text::{Line, Span},
        widgets::Paragraph,
    },
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the status bar at the bottom of the screen.
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    plugins: usize,
    ticks: u64,
    theme: &Theme,
) {
    let layout = Layout::horizontal([
        Constraint::Length(10), // mode indicator
        Constraint::Min(1),     // status info
    ])
    .split(area);

    let (mode_text, mode_style) = match state.input_mode {
        InputMode::Normal => (" NORMAL ", theme.mode_normal),
        InputMode::Command => (" COMMAND", theme.mode_command),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(mode_text, mode_style))),
        layout[0],
    );

    let mut parts: Vec<Span<'_>> = Vec::new();

    let spinner = SPINNER[(ticks % SPINNER.len() as u64) as usize];
    let (conn_text, conn_style) = match state.connection {
        ConnectionDisplay::Disconnected => (" Disconnected ".to_owned(), theme.status_disconnected),
        ConnectionDisplay::Connecting => (format!(" Connecting {spinner} "), theme.status_connecting),
        ConnectionDisplay::Connected => (" Connected ".to_owned(), theme.status_connected),
    };
    parts.push(Span::styled(conn_text, conn_style));
    parts.push(Span::raw(format!(" {} | {plugins} plugins ", state.host)));

    if let Some(notice) = state.last_notice() {
        let style = match notice.level {
            NoticeLevel::Info => theme.notice_info,
            NoticeLevel::Warn => theme.notice_warn,
            NoticeLevel::Error => theme.notice_error,
        };
        parts.push(Span::raw("| "));
        parts.push(Span::styled(notice.text.as_str(), style));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), layout[1]);
}
