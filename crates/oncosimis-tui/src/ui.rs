use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use oncosimis_core::{ChatRole, ConnectivityState, MessageKind};
use crate::app::{App, FocusPane, InputMode};

/// Render `**bold**` runs; unbalanced markers are left as typed.
fn markdown_line(text: &str, base: Style) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        return Line::from(Span::styled(text.to_string(), base));
    }

    let spans: Vec<Span<'static>> = parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            let style = if i % 2 == 1 {
                base.add_modifier(Modifier::BOLD)
            } else {
                base
            };
            Span::styled(part.to_string(), style)
        })
        .collect();

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.has_files() {
        let [chat_column, files_area] = Layout::horizontal([
            Constraint::Percentage(70),
            Constraint::Percentage(30),
        ])
        .areas(body_area);
        render_chat_column(app, frame, chat_column);
        render_files(app, frame, files_area);
    } else {
        app.files_area = None;
        render_chat_column(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let connectivity = app.session.connectivity();
    let indicator_color = match connectivity.state {
        ConnectivityState::Online => Color::Green,
        ConnectivityState::Degraded => Color::Yellow,
        ConnectivityState::Offline => Color::Red,
    };

    let title = Line::from(vec![
        Span::styled(" Oncosimis AI Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("● ", Style::default().fg(indicator_color)),
        Span::styled(connectivity.state.label(), Style::default().fg(indicator_color).bold()),
        Span::styled(format!(" ({}) ", connectivity.reason), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_column(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_chat(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Chat && app.input_mode == InputMode::Normal;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(format!(" Chat: {} ", app.session.connectivity()));

    let transcript = app.session.transcript();
    let chat_text = if transcript.is_empty() && !app.session.awaiting_reply() {
        Text::from(Span::styled(
            "Ask about Oncosimis, its platforms, or request an SOP...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript.entries() {
            let (label, label_color, body_style) = match (msg.role, msg.kind) {
                (ChatRole::User, _) => ("You:", Color::Cyan, Style::default()),
                (ChatRole::Assistant, MessageKind::Text) => ("Assistant:", Color::Yellow, Style::default()),
                (ChatRole::Assistant, MessageKind::Warning) => {
                    ("Notice:", Color::Yellow, Style::default().fg(Color::Yellow))
                }
                (ChatRole::Assistant, MessageKind::Error) => {
                    ("Error:", Color::Red, Style::default().fg(Color::Red))
                }
            };

            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(label_color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(markdown_line(line, body_style));
            }
            for file in &msg.files {
                lines.push(Line::from(vec![
                    Span::styled("  ⬇ ", Style::default().fg(Color::Magenta)),
                    Span::styled(file.filename.clone(), Style::default().fg(Color::Magenta).underlined()),
                ]));
            }
            lines.push(Line::default());
        }

        if app.session.awaiting_reply() {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let title = if app.session.can_send() {
        " Message (Enter to send) "
    } else {
        " Waiting for reply... "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else {
        (app.input_cursor + 1).saturating_sub(inner_width)
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (app.input_cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_files(app: &mut App, frame: &mut Frame, area: Rect) {
    app.files_area = Some(area);

    let focused = app.focus == FocusPane::Files;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::Magenta }))
        .title(" Files (Tab, Enter to download) ");

    let items: Vec<ListItem> = app
        .file_refs()
        .iter()
        .map(|file| ListItem::new(format!(" {} ", file.filename)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.files_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" TYPING ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => {
            hints.extend(hint(" Enter ", " send "));
            hints.extend(hint(" Esc ", " stop typing "));
        }
        (InputMode::Normal, FocusPane::Files) => {
            hints.extend(hint(" j/k ", " select "));
            hints.extend(hint(" Enter ", " download "));
            hints.extend(hint(" Tab ", " chat "));
        }
        (InputMode::Normal, FocusPane::Chat) => {
            hints.extend(hint(" i ", " type "));
            hints.extend(hint(" j/k ", " scroll "));
            if app.has_files() {
                hints.extend(hint(" Tab ", " files "));
            }
            hints.extend(hint(" C ", " clear "));
            hints.extend(hint(" q ", " quit "));
        }
    }

    if let Some(path) = app.session.last_download() {
        hints.push(Span::styled(
            format!(" Saved {} ", path.display()),
            Style::default().bg(Color::Black).fg(Color::Green),
        ));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
