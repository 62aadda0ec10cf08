use ratatui::style::{Color, Modifier, Style};

/// Color theme for the TUI.
pub struct Theme {
    pub title: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub heading: Style,
    pub attr_name: Style,
    pub attr_value: Style,
    pub muted: Style,
    pub inbox: Style,
    pub hint_key: Style,
    pub status_connected: Style,
    pub status_connecting: Style,
    pub status_disconnected: Style,
    pub mode_normal: Style,
    pub mode_command: Style,
    pub notice_info: Style,
    pub notice_warn: Style,
    pub notice_error: Style,
    pub border: Style,
    pub border_focused: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            tab_inactive: Style::default().fg(Color::Gray),
            heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            attr_name: Style::default().fg(Color::Magenta),
            attr_value: Style::default().fg(Color::White),
            muted: Style::default().fg(Color::DarkGray),
            inbox: Style::default().fg(Color::Green),
            hint_key: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            status_connected: Style::default().bg(Color::Green).fg(Color::Black),
            status_connecting: Style::default().bg(Color::Yellow).fg(Color::Black),
            status_disconnected: Style::default().bg(Color::DarkGray).fg(Color::White),
            mode_normal: Style::default().bg(Color::Blue).fg(Color::White),
            mode_command: Style::default().bg(Color::Magenta).fg(Color::White),
            notice_info: Style::default().fg(Color::Gray),
            notice_warn: Style::default().fg(Color::Yellow),
            notice_error: Style::default().fg(Color::Red),
            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
        }
    }
}
