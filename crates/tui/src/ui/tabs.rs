use {
    super::theme::Theme,
    crate::surface::TerminalSurface,
    marquee_display::Display,
    ratatui::{
        Frame,
        layout::Rect,
        text::{Line, Span},
        widgets::Paragraph,
    },
};

/// Render the header: app name followed by one tab per registered plugin,
/// the selected one highlighted.
pub fn draw(frame: &mut Frame, area: Rect, display: &Display<TerminalSurface>, theme: &Theme) {
    let mut spans: Vec<Span<'_>> = vec![Span::styled(" marquee ", theme.title), Span::raw(" ")];

    if display.registry().is_empty() {
        spans.push(Span::styled("no plugins", theme.muted));
    }

    let selection = display.selection();
    for name in display.registry().names() {
        let style = if selection.is_selected(name) {
            theme.tab_active
        } else {
            theme.tab_inactive
        };
        spans.push(Span::styled(format!(" {name} "), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
