use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::chat::THINKING;
use crate::message::{AnswerSource, Message, Role};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                if !current_text.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current_text), base));
                }
                spans.push(Span::styled(bold_text, base.add_modifier(Modifier::BOLD)));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
                if found_close {
                    current_text.push_str("**");
                }
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, base));
    }

    Line::from(spans)
}

fn tag_style(source: AnswerSource) -> Style {
    match source {
        AnswerSource::File => Style::default().bg(Color::Green).fg(Color::Black),
        AnswerSource::Llm => Style::default().bg(Color::Magenta).fg(Color::White),
    }
}

/// Lines for one chat bubble: a role header, the text, then a spacer
pub fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let body_style = if msg.small {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };

    let mut lines = Vec::new();
    match msg.role {
        Role::User => {
            lines.push(
                Line::from(Span::styled("You", Style::default().fg(Color::Cyan).bold()))
                    .alignment(Alignment::Right),
            );
            for text in msg.text.lines() {
                lines.push(
                    Line::from(Span::styled(text.to_string(), body_style.fg(Color::Cyan)))
                        .alignment(Alignment::Right),
                );
            }
        }
        Role::Assistant => {
            let mut header = vec![Span::styled(
                "Assistant",
                Style::default().fg(Color::Yellow).bold(),
            )];
            if let (Some(source), Some(tag)) = (msg.source, msg.tag()) {
                header.push(Span::raw(" "));
                header.push(Span::styled(format!(" {} ", tag), tag_style(source)));
            }
            lines.push(Line::from(header));
            for text in msg.text.lines() {
                lines.push(parse_markdown_line(text, body_style));
            }
        }
    }
    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.input_mode == InputMode::PickingFile {
        render_file_picker(app, frame, area);
    }

    render_toasts(app, frame, chat_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" XplainDfile ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}] ", app.file_label), Style::default().fg(Color::White)),
        Span::styled(app.active_source.clone(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Chat ");
    let inner = block.inner(area);

    let dots = ".".repeat(app.animation_frame as usize + 1);
    let mut lines: Vec<Line> = Vec::new();
    for msg in app.log.messages() {
        if app.session.is_chatting && msg.small && msg.text == THINKING {
            let animated = Message {
                text: format!("Thinking{}", dots),
                ..msg.clone()
            };
            lines.extend(message_lines(&animated));
        } else {
            lines.extend(message_lines(msg));
        }
    }

    // Count rows with the same word wrapper that renders them
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = u16::try_from(chat.line_count(inner.width)).unwrap_or(u16::MAX);
    let offset = app.log.viewport_offset(total, inner.height);

    frame.render_widget(chat.block(block).scroll((offset, 0)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let (title, border_color) = if !app.chat_enabled {
        (" Upload a PDF to enable chat ", Color::DarkGray)
    } else if editing {
        (" Ask (Enter to send) ", Color::Yellow)
    } else {
        (" Ask (i to focus) ", Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && app.chat_cursor >= inner_width {
        app.chat_cursor - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_style = if app.chat_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible_text).style(text_style).block(block);
    frame.render_widget(input, area);

    if editing && !area.is_empty() {
        let cursor_x = (app.chat_cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing | InputMode::PickingFile => {
            Style::default().bg(Color::Yellow).fg(Color::Black)
        }
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " CHAT ",
        InputMode::PickingFile => " OPEN ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: Vec<(&str, &str)> = match app.input_mode {
        InputMode::Normal => {
            let mut keys = Vec::new();
            if app.picker_enabled {
                keys.push((" u ", " upload "));
            }
            if app.chat_enabled {
                keys.push((" i ", " chat "));
            }
            keys.extend([(" j/k ", " scroll "), (" r ", " reset "), (" q ", " quit ")]);
            keys
        }
        InputMode::Editing => vec![(" Enter ", " send "), (" Esc ", " stop typing ")],
        InputMode::PickingFile => vec![(" Enter ", " upload "), (" Esc ", " cancel ")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    for (key, label) in keys {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_file_picker(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 70.min(area.width.saturating_sub(4));
    let popup_height = 5;
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Open PDF ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let hint_area = Rect::new(inner.x, inner.y, inner.width, 1).intersection(inner);
    if !hint_area.is_empty() {
        let hint = Paragraph::new("Path to a .pdf file. Enter to upload, Esc to cancel.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, hint_area);
    }

    // Short terminals cut the popup off before the input row
    let input_area =
        Rect::new(inner.x, inner.y.saturating_add(2), inner.width, 1).intersection(inner);
    if input_area.is_empty() {
        return;
    }
    let width = input_area.width as usize;
    let scroll_offset = if width > 0 && app.path_cursor >= width {
        app.path_cursor - width + 1
    } else {
        0
    };
    let visible: String = app.path_input.chars().skip(scroll_offset).take(width).collect();
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    let cursor_x = (app.path_cursor - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

/// Newest toast sits lowest, in the bottom-right corner of `area`
fn render_toasts(app: &App, frame: &mut Frame, area: Rect) {
    let mut bottom = area.y + area.height.saturating_sub(1);
    for toast in app.notifier.visible().iter().rev() {
        let width = (toast.text.chars().count() as u16 + 4)
            .max(5)
            .min(area.width);
        let height = 3;
        if bottom < area.y + height {
            break;
        }
        let toast_area = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            bottom - height,
            width,
            height,
        )
        .intersection(area);
        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(toast.text.clone())
                .style(Style::default().fg(Color::White))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                ),
            toast_area,
        );
        bottom -= height;
    }
}
