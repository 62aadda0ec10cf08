use {
    super::theme::Theme,
    crate::surface::{TerminalElement, TerminalSurface},
    marquee_display::{Display, Plugin},
    ratatui::{
        Frame,
        layout::Rect,
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Wrap},
    },
};

/// Render the mounted plugin element: its attributes, script, messaging
/// state and the most recent inbound messages.
pub fn draw(frame: &mut Frame, area: Rect, display: &Display<TerminalSurface>, theme: &Theme) {
    let rendered = display.reconciler().rendered();
    let title = match rendered {
        Some(plugin) => format!(" <{}> v{} ", plugin.name, plugin.version),
        None => " (nothing rendered) ".into(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(title);

    let lines = match (rendered, display.surface().current()) {
        (Some(plugin), Some(element)) => element_lines(plugin, element, display.surface(), theme),
        _ => vec![Line::from(Span::styled(
            "Waiting for plugins from the server...",
            theme.muted,
        ))],
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn element_lines<'a>(
    plugin: &'a Plugin,
    element: &'a TerminalElement,
    surface: &'a TerminalSurface,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    if let Some(description) = plugin.description.as_deref() {
        lines.push(Line::from(Span::raw(description)));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Attributes", theme.heading)));
    if element.attributes.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", theme.muted)));
    }
    for (name, value) in &element.attributes {
        lines.push(Line::from(vec![
            Span::styled(format!("  {name}"), theme.attr_name),
            Span::raw(" = "),
            Span::styled(value.as_str(), theme.attr_value),
        ]));
    }

    lines.push(Line::from(""));
    for script in surface.scripts() {
        lines.push(Line::from(vec![
            Span::styled("Script ", theme.heading),
            Span::raw(script.as_str()),
        ]));
    }

    if element.link().is_none() {
        lines.push(Line::from(Span::styled("No background messaging", theme.muted)));
        return lines;
    }

    let inbox = element.inbox();
    lines.push(Line::from(Span::styled(
        format!("Messages ({})", inbox.len()),
        theme.heading,
    )));
    for mesg in inbox.iter().rev() {
        lines.push(Line::from(Span::styled(format!("  {mesg}"), theme.inbox)));
    }
    lines
}
