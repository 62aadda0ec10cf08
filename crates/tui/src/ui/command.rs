use {
    super::theme::Theme,
    crate::state::{AppState, InputMode},
    ratatui::{
        Frame,
        layout::Rect,
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph},
    },
    tui_textarea::TextArea,
};

const HINTS: [(&str, &str); 4] = [("Tab/n", "Next"), (":", "Command"), ("q", "Quit"), ("Ctrl+C", "Quit")];

/// Render the command line while in command mode, key hints otherwise.
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    textarea: &mut TextArea<'_>,
    theme: &Theme,
) {
    match state.input_mode {
        InputMode::Command => {
            textarea.set_cursor_line_style(Style::default());
            textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
            textarea.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_focused)
                    .title(" : (Enter to run, Esc to cancel) "),
            );
            frame.render_widget(&*textarea, area);
        },
        InputMode::Normal => {
            let mut spans = Vec::new();
            for (key, label) in HINTS {
                spans.push(Span::styled(format!(" {key}"), theme.hint_key));
                spans.push(Span::styled(format!(" {label} "), theme.muted));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), area);
        },
    }
}
