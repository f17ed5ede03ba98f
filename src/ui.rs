use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::theme::Palette;

pub fn render(frame: &mut Frame, app: &mut App) {
    let palette = app.palette();
    let area = frame.area();

    // Paint the whole frame with the theme background first
    frame.render_widget(
        Block::default().style(ratatui::style::Style::default().bg(palette.background)),
        area,
    );

    let [header_area, log_area, input_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    render_header(frame, app, header_area, &palette);
    render_log(frame, app, log_area, &palette);
    render_input(frame, app, input_area, &palette);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border)
        .title(Span::styled(" Parley ", palette.title));

    let hint = Line::from(Span::styled(
        format!(
            "theme: {} (Ctrl+T)  quit (Esc)",
            app.theme.get().as_str()
        ),
        palette.hint,
    ));

    let header = Paragraph::new(hint)
        .block(block)
        .alignment(Alignment::Right);

    frame.render_widget(header, area);
}

fn render_log(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    // Store log dimensions for scroll calculations (inner size minus borders)
    app.log_height = area.height.saturating_sub(2);
    app.log_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border)
        .title(" Conversation ");

    let text = if app.messages.is_empty() && !app.is_loading() {
        Text::from(vec![
            Line::default(),
            Line::from(Span::styled(
                "Hello! Type a message below to begin.",
                palette.placeholder,
            )),
        ])
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.messages {
            let (prefix, prefix_style) = if msg.from_user {
                ("You:", palette.user_prefix)
            } else {
                ("Agent:", palette.agent_prefix)
            };
            lines.push(Line::from(Span::styled(prefix, prefix_style)));

            // Embedded newlines become separate rendered lines
            for line in msg.text.lines() {
                lines.push(Line::from(Span::styled(line, palette.message_text)));
            }
            lines.push(Line::default());
        }

        if app.is_loading() {
            lines.push(Line::from(Span::styled("Agent:", palette.agent_prefix)));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Typing{}", dots),
                palette.typing,
            )));
        }

        Text::from(lines)
    };

    let log = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.log_scroll, 0));

    frame.render_widget(log, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = if app.is_loading() {
        Span::styled(" Waiting for reply... ", palette.hint)
    } else {
        Span::styled(" Message (Enter to send) ", palette.hint)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border)
        .title(title);

    let input = Paragraph::new(Span::styled(app.draft.as_str(), palette.input_text)).block(block);
    frame.render_widget(input, area);

    // Cursor only while the field accepts input
    if !app.is_loading() {
        let inner_width = area.width.saturating_sub(2);
        let x = area.x + 1 + (app.draft_cursor as u16).min(inner_width.saturating_sub(1));
        frame.set_cursor_position((x, area.y + 1));
    }
}
