pub mod command;
pub mod plugin;
pub mod status_bar;
pub mod tabs;
pub mod theme;

use {
    crate::{
        state::{AppState, InputMode},
        surface::TerminalSurface,
    },
    marquee_display::Display,
    ratatui::{
        Frame,
        layout::{Constraint, Layout},
    },
    theme::Theme,
    tui_textarea::TextArea,
};

/// Draw the entire UI.
pub fn draw(
    frame: &mut Frame,
    state: &AppState,
    display: &Display<TerminalSurface>,
    command_line: &mut TextArea<'_>,
    ticks: u64,
    theme: &Theme,
) {
    let command_height = match state.input_mode {
        InputMode::Command => 3,
        InputMode::Normal => 1,
    };
    let vertical = Layout::vertical([
        Constraint::Length(1),              // plugin tabs
        Constraint::Min(5),                 // rendered plugin
        Constraint::Length(command_height), // command line or hints
        Constraint::Length(1),              // status bar
    ])
    .split(frame.area());

    tabs::draw(frame, vertical[0], display, theme);
    plugin::draw(frame, vertical[1], display, theme);
    command::draw(frame, vertical[2], state, command_line, theme);
    status_bar::draw(
        frame,
        vertical[3],
        state,
        display.registry().len(),
        ticks,
        theme,
    );
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::state::{ConnectionDisplay, NoticeLevel},
        marquee_display::{HostAddress, testing::RecordingOutbox},
        ratatui::{Terminal, backend::TestBackend},
        serde_json::json,
        std::sync::Arc,
    };

    fn display() -> Display<TerminalSurface> {
        Display::new(
            TerminalSurface::new(5),
            Arc::new(RecordingOutbox::default()),
            HostAddress::parse("localhost:3012").unwrap(),
        )
    }

    fn load(display: &mut Display<TerminalSurface>) {
        let list = json!({"type": "listPlugins", "data": [
            {
                "name": "clock",
                "version": "1.2.0",
                "description": "Shows the time",
                "configs": [
                    {"name": "enabled", "type": "checkbox", "value": true, "default": true},
                    {"name": "format", "type": "text", "value": "HH:mm", "default": "HH:mm"}
                ],
                "script": {"url": "/clock.js"},
                "backgroundScript": {"url": "/clock-bg.js"}
            },
            {
                "name": "weather",
                "version": "0.3.0",
                "configs": [{"name": "enabled", "type": "checkbox", "value": true, "default": true}],
                "script": {"url": "/weather.js"}
            }
        ]});
        display.handle_frame(&list.to_string());
    }

    fn render_to_text(state: &AppState, display: &Display<TerminalSurface>) -> String {
        let backend = TestBackend::new(80, 20);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(error) => panic!("failed to create test terminal: {error}"),
        };
        let mut textarea = TextArea::default();
        let theme = Theme::default();

        if let Err(error) = terminal.draw(|frame| {
            draw(frame, state, display, &mut textarea, 0, &theme);
        }) {
            panic!("failed to draw test frame: {error}");
        }

        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn empty_display_waits_for_plugins() {
        let state = AppState::new("localhost:3012");
        let text = render_to_text(&state, &display());
        assert!(text.contains("no plugins"));
        assert!(text.contains("Waiting for plugins"));
        assert!(text.contains("Connecting"));
        assert!(text.contains("localhost:3012 | 0 plugins"));
    }

    #[test]
    fn renders_tabs_attributes_and_script() {
        let mut display = display();
        load(&mut display);
        let mut state = AppState::new("localhost:3012");
        state.connection = ConnectionDisplay::Connected;

        let text = render_to_text(&state, &display);
        assert!(text.contains(" clock "));
        assert!(text.contains(" weather "));
        assert!(text.contains("<clock> v1.2.0"));
        assert!(text.contains("Shows the time"));
        assert!(text.contains("format = HH:mm"));
        assert!(text.contains("http://localhost:3012/clock.js"));
        assert!(text.contains("Messages (0)"));
        assert!(text.contains("2 plugins"));
        assert!(!text.contains("enabled ="));
    }

    #[test]
    fn shows_inbound_messages() {
        let mut display = display();
        load(&mut display);
        let frame = json!({"type": "pluginMessage", "data": {"name": "clock", "mesg": {"now": "12:00"}}});
        display.handle_frame(&frame.to_string());

        let text = render_to_text(&AppState::new("h"), &display);
        assert!(text.contains("Messages (1)"));
        assert!(text.contains(r#"{"now":"12:00"}"#));
    }

    #[test]
    fn plugin_without_background_has_no_messaging() {
        let mut display = display();
        load(&mut display);
        display.cycle();

        let text = render_to_text(&AppState::new("h"), &display);
        assert!(text.contains("<weather> v0.3.0"));
        assert!(text.contains("No background messaging"));
    }

    #[test]
    fn command_mode_and_notices() {
        let mut state = AppState::new("h");
        state.input_mode = InputMode::Command;
        state.notify(NoticeLevel::Warn, "unknown plugin: nope");

        let text = render_to_text(&state, &display());
        assert!(text.contains("COMMAND"));
        assert!(text.contains("Enter to run"));
        assert!(text.contains("unknown plugin: nope"));
    }
}
