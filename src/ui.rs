use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::chat::{ChatRole, QUICK_QUESTIONS};
use crate::config;
use crate::content::{self, ProjectStatus};
use crate::section::Section;

const MATRIX: Color = Color::Rgb(0, 255, 170);
const MATRIX_DARK: Color = Color::Rgb(0, 170, 119);
const DIM: Color = Color::Rgb(110, 110, 110);
const CONTENT_MAX_WIDTH: u16 = 90;
const CHAT_WIDTH: u16 = 50;
const CHAT_HEIGHT: u16 = 24;

/// Split `**bold**` runs out of a line of assistant text. An unmatched
/// `**` is kept literally.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    let closed = parts.len() % 2 == 1;

    let mut spans = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && (closed || !is_last) && !part.is_empty() {
            spans.push(Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD)));
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{part}")));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    frame.render_widget(&app.rain, area);

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let body_width = body_area.width.min(CONTENT_MAX_WIDTH);
    let body = Rect {
        x: body_area.x + (body_area.width - body_width) / 2,
        width: body_width,
        ..body_area
    }
    .inner(Margin { horizontal: 2, vertical: 1 });

    match app.section {
        Section::Home => render_home(frame, body),
        Section::Projects => render_projects(frame, body),
        Section::Skills => render_skills(frame, body),
        Section::Contact => render_contact(frame, body),
    }

    render_footer(app, frame, footer_area);

    if app.chat_open {
        render_chat(app, frame, area);
    } else {
        app.hit_areas.quick_questions.clear();
        app.hit_areas.chat_messages = Rect::default();
    }
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let brand = Line::from(vec![
        Span::styled(format!(" {} ", content::NAME), Style::default().fg(Color::White).bold()),
        Span::styled("│ ", Style::default().fg(DIM)),
        Span::styled(content::ROLE, Style::default().fg(DIM)),
    ]);
    frame.render_widget(Paragraph::new(brand), area);

    // Nav tabs are right-aligned; record each tab for mouse clicks
    let tabs: Vec<(Section, String)> = Section::all()
        .iter()
        .map(|s| (*s, format!(" {} {} ", s.index() + 1, s.label())))
        .collect();
    let total: u16 = tabs.iter().map(|(_, t)| t.chars().count() as u16 + 1).sum();

    app.hit_areas.nav_tabs.clear();
    let mut x = area.x + area.width.saturating_sub(total);
    for (section, label) in tabs {
        let width = (label.chars().count() as u16).min(area.right().saturating_sub(x));
        if width == 0 {
            break;
        }
        let rect = Rect::new(x, area.y, width, 1);
        let style = if section == app.section {
            Style::default().fg(Color::Black).bg(MATRIX).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
        app.hit_areas.nav_tabs.push((section, rect));
        x += width + 1;
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mode_text = match app.input_mode {
        InputMode::Normal => Span::styled(" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => Span::styled(" CHAT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let mut hints = vec![mode_text, Span::raw(" ")];
    let pairs: &[(&str, &str)] = match (app.input_mode, app.chat_open) {
        (InputMode::Editing, _) => &[
            (" Enter ", " send "),
            (" F1-F3 ", " quick "),
            (" ↑/↓ ", " scroll "),
            (" Esc ", " done "),
        ],
        (InputMode::Normal, true) => &[
            (" c ", " type "),
            (" F1-F3 ", " quick "),
            (" j/k ", " scroll "),
            (" Esc ", " close "),
            (" q ", " quit "),
        ],
        (InputMode::Normal, false) => &[
            (" 1-4 ", " section "),
            (" Tab ", " next "),
            (" c ", " chat "),
            (" q ", " quit "),
        ],
    };
    for (key, label) in pairs {
        hints.push(Span::styled(*key, key_style));
        hints.push(Span::styled(*label, label_style));
    }

    let [hints_area, status_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(40)]).areas(area);
    frame.render_widget(Paragraph::new(Line::from(hints)), hints_area);

    let online = if app.chat_enabled() {
        let source = app.key_source.unwrap_or("config");
        Span::styled(format!("● Online ({source})"), Style::default().fg(MATRIX))
    } else {
        Span::styled("○ Chat offline", Style::default().fg(DIM))
    };
    let status = Line::from(vec![
        Span::styled(content::FOOTER, Style::default().fg(DIM)),
        Span::raw("  "),
        online,
        Span::raw(" "),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Right), status_area);
}

fn heading(title: &str, subtitle: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(title.to_string(), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(subtitle.to_string(), Style::default().fg(DIM))),
        Line::default(),
    ]
}

fn render_home(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("● ", Style::default().fg(MATRIX)),
            Span::styled(content::AVAILABILITY, Style::default().fg(Color::Gray)),
        ]),
        Line::default(),
        Line::from(Span::styled(
            content::NAME.chars().map(|c| format!("{c} ")).collect::<String>(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("──── ", Style::default().fg(MATRIX)),
            Span::styled(content::TITLE, Style::default().fg(Color::White)),
        ]),
        Line::default(),
        Line::from(Span::styled(content::TAGLINE, Style::default().fg(Color::Gray))),
        Line::default(),
    ];

    let mut values = Vec::new();
    let mut labels = Vec::new();
    for stat in content::STATS {
        values.push(Span::styled(format!("{:<20}", stat.value), Style::default().fg(Color::White).bold()));
        labels.push(Span::styled(format!("{:<20}", stat.label), Style::default().fg(DIM)));
    }
    lines.push(Line::from(values));
    lines.push(Line::from(labels));
    lines.push(Line::default());

    let button = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    lines.push(Line::from(vec![
        Span::styled("[p] View Projects", button),
        Span::raw("    "),
        Span::styled("[m] Contact Me", button),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn status_style(status: ProjectStatus) -> Style {
    match status {
        ProjectStatus::Live => Style::default().fg(MATRIX),
        ProjectStatus::Refactoring => Style::default().fg(Color::Yellow),
        ProjectStatus::InProgress => Style::default().fg(Color::LightBlue),
    }
}

fn render_projects(frame: &mut Frame, area: Rect) {
    let mut lines = heading("Projects", Section::Projects.subtitle());

    for project in content::PROJECTS {
        lines.push(Line::from(vec![
            Span::styled(project.name, Style::default().fg(Color::White).bold()),
            Span::raw("  "),
            Span::styled(format!("[{}]", project.status.label()), status_style(project.status)),
        ]));
        lines.push(Line::from(Span::styled(project.description, Style::default().fg(Color::Gray))));

        let mut tags = Vec::new();
        for tech in project.tech {
            tags.push(Span::styled(format!(" {tech} "), Style::default().fg(Color::Gray).bg(Color::Rgb(30, 30, 30))));
            tags.push(Span::raw(" "));
        }
        lines.push(Line::from(tags));
        lines.push(Line::default());
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_skills(frame: &mut Frame, area: Rect) {
    let [heading_area, groups_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(heading("Skills", Section::Skills.subtitle())), heading_area);

    let columns = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .spacing(2)
        .split(groups_area);

    for (group, column) in content::SKILL_GROUPS.iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(group.title, Style::default().fg(Color::Gray)));

        let bar_width = column.width.saturating_sub(6).max(4) as usize;
        let mut lines = Vec::new();
        for skill in group.skills {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<w$}", skill.name, w = bar_width), Style::default().fg(Color::White)),
                Span::styled(format!("{:>4}%", skill.level), Style::default().fg(DIM)),
            ]));
            lines.push(Line::from(Span::styled(
                content::level_bar(skill.level, bar_width),
                Style::default().fg(MATRIX_DARK),
            )));
            lines.push(Line::default());
        }

        let inner = Rect { y: column.y + 1, height: column.height.saturating_sub(1), ..*column };
        frame.render_widget(block, Rect { height: 1, ..*column });
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_contact(frame: &mut Frame, area: Rect) {
    let [heading_area, rest] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(heading("Contact", Section::Contact.subtitle())), heading_area);

    let [contacts_area, form_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(4)
            .areas(rest);

    let mut y = contacts_area.y;
    for contact in content::CONTACTS {
        if y + 4 > contacts_area.bottom() {
            break;
        }
        let card = Rect::new(contacts_area.x, y, contacts_area.width, 4);
        let text = Text::from(vec![
            Line::from(Span::styled(contact.label, Style::default().fg(DIM))),
            Line::from(Span::styled(contact.value, Style::default().fg(Color::White))),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(text).block(block), card);
        y += 4;
    }

    // Display-only form, matching the site layout
    let mut y = form_area.y;
    for (i, placeholder) in content::CONTACT_FORM_FIELDS.iter().enumerate() {
        let height = if i == content::CONTACT_FORM_FIELDS.len() - 1 { 5 } else { 3 };
        if y + height > form_area.bottom() {
            break;
        }
        let field = Rect::new(form_area.x, y, form_area.width, height);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(
            Paragraph::new(Span::styled(*placeholder, Style::default().fg(DIM))).block(block),
            field,
        );
        y += height;
    }
    if y + 3 <= form_area.bottom() {
        let button = Paragraph::new(Span::styled("Send Message", Style::default().fg(Color::White).bold()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Gray)));
        frame.render_widget(button, Rect::new(form_area.x, y, form_area.width, 3));
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = CHAT_WIDTH.min(area.width.saturating_sub(2));
    let height = CHAT_HEIGHT.min(area.height.saturating_sub(2));
    if width < 10 || height < 8 {
        return;
    }

    // Anchored bottom-right above the footer
    let popup = Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom().saturating_sub(height + 1),
        width,
        height,
    );
    frame.render_widget(Clear, popup);

    let focused = app.input_mode == InputMode::Editing;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { MATRIX } else { MATRIX_DARK }))
        .title(Line::from(vec![
            Span::styled(" AI ", Style::default().fg(Color::Black).bg(MATRIX).bold()),
            Span::styled(" Enzo's Assistant ", Style::default().fg(Color::White).bold()),
        ]))
        .title_bottom(Line::from(Span::styled(" Powered by Groq ", Style::default().fg(DIM))).right_aligned());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if !app.chat_enabled() {
        render_chat_disabled(frame, inner);
        return;
    }

    let [messages_area, input_area, chips_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_chat_messages(app, frame, messages_area);
    render_chat_input(app, frame, input_area);
    render_quick_questions(app, frame, chips_area);
}

fn render_chat_disabled(frame: &mut Frame, area: Rect) {
    let path = config::Config::get_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "config.json".to_string());
    let text = Text::from(vec![
        Line::from(Span::styled("Chat is offline: no API key configured.", Style::default().fg(Color::Yellow))),
        Line::default(),
        Line::from(format!("Set {} in the environment,", config::API_KEY_ENV)),
        Line::from("or add \"api_key\" to:"),
        Line::from(Span::styled(path, Style::default().fg(DIM))),
        Line::default(),
        Line::from(Span::styled("Esc to close", Style::default().fg(DIM))),
    ]);
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
}

fn render_chat_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let text_width = area.width.saturating_sub(1);
    let mut lines: Vec<Line> = Vec::new();

    let typing_target = match app.chat.phase() {
        crate::chat::ChatPhase::Revealing(reveal) => Some(reveal.target()),
        _ => None,
    };

    for (idx, msg) in app.chat.messages().iter().enumerate() {
        let (label, style) = match msg.role {
            ChatRole::User => ("You:", Style::default().fg(MATRIX).bold()),
            ChatRole::Assistant => ("AI:", Style::default().fg(Color::White).bold()),
        };
        lines.push(Line::from(Span::styled(label, style)));

        let content = app.chat.display_content(idx);
        let mut body: Vec<Line> = content.lines().map(parse_markdown_line).collect();
        if typing_target == Some(idx) {
            match body.last_mut() {
                Some(last) => last.push_span(Span::styled("▌", Style::default().fg(MATRIX))),
                None => body.push(Line::from(Span::styled("▌", Style::default().fg(MATRIX)))),
            }
        }
        lines.extend(body);
        lines.push(Line::default());
    }

    if app.chat.is_awaiting_reply() {
        lines.push(Line::from(Span::styled("AI:", Style::default().fg(Color::White).bold())));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default().fg(MATRIX).add_modifier(Modifier::ITALIC),
        )));
    }

    // Measure with the same word wrapping the paragraph renders with
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = paragraph.line_count(text_width).min(u16::MAX as usize) as u16;
    app.chat_max_scroll = total.saturating_sub(area.height);
    if app.chat_follow {
        app.chat_scroll = app.chat_max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(app.chat_max_scroll);
    }
    app.hit_areas.chat_messages = area;

    let text_area = Rect { width: text_width, ..area };
    frame.render_widget(paragraph.scroll((app.chat_scroll, 0)), text_area);

    if app.chat_max_scroll > 0 {
        let mut state = ScrollbarState::new(app.chat_max_scroll as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area,
            &mut state,
        );
    }
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let awaiting = app.chat.is_awaiting_reply();
    let editing = app.input_mode == InputMode::Editing;

    let border = if awaiting {
        Color::DarkGray
    } else if editing && app.chat.can_submit() {
        MATRIX
    } else if editing {
        Color::Yellow
    } else {
        DIM
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let input = if app.chat.input.is_empty() {
        Paragraph::new(Span::styled("輸入訊息...", Style::default().fg(Color::DarkGray)))
    } else {
        let style = if awaiting { Style::default().fg(DIM) } else { Style::default().fg(Color::White) };
        Paragraph::new(Span::styled(app.chat.input.as_str(), style))
    };

    // Keep the cursor visible by scrolling long input horizontally
    let inner_width = area.width.saturating_sub(2);
    let prefix: String = app.chat.input.chars().take(app.chat.cursor).collect();
    let cursor_col = Line::from(prefix).width() as u16;
    let h_scroll = cursor_col.saturating_sub(inner_width.saturating_sub(1));

    frame.render_widget(input.block(block).scroll((0, h_scroll)), area);

    if editing && !awaiting {
        frame.set_cursor_position((area.x + 1 + cursor_col - h_scroll, area.y + 1));
    }
}

fn render_quick_questions(app: &mut App, frame: &mut Frame, area: Rect) {
    let disabled = app.chat.is_awaiting_reply();
    let style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    };

    app.hit_areas.quick_questions.clear();
    let mut x = area.x;
    for (i, question) in QUICK_QUESTIONS.iter().enumerate() {
        let label = Line::from(vec![
            Span::styled(format!("F{} ", i + 1), Style::default().fg(MATRIX_DARK)),
            Span::styled(*question, style),
        ]);
        let width = (label.width() as u16).min(area.right().saturating_sub(x));
        if width == 0 {
            break;
        }
        let rect = Rect::new(x, area.y, width, 1);
        frame.render_widget(Paragraph::new(label), rect);
        app.hit_areas.quick_questions.push(rect);
        x += width + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("use **Rust** here");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Rust");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
        assert!(line.spans.iter().all(|s| !s.style.add_modifier.contains(Modifier::BOLD)));
    }

    #[test]
    fn test_following_chat_shows_end_of_wrapped_reply() {
        let mut config = Config::new();
        config.api_key = Some("gsk_test".to_string());
        let mut app = App::new(&config, 120, 40);
        app.open_chat();

        // Each 24-char word takes its own row once word-wrapped
        for n in 0..3 {
            app.chat.input = format!("question {n}");
            app.chat.submit().unwrap();
            let words: Vec<String> = (0..6)
                .map(|i| if i == 5 { format!("{:X<12}FINALWORDEND", n) } else { "W".repeat(24) })
                .collect();
            app.chat.receive(Ok(words.join(" ")));
            while app.chat.is_revealing() {
                app.chat.step_reveal();
            }
        }

        assert!(app.chat_follow);
        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("2XXXXXXXXXXXFINALWORDEND"));
        assert_eq!(app.chat_scroll, app.chat_max_scroll);
    }

    #[test]
    fn test_each_section_renders_its_content() {
        let mut app = App::new(&Config::new(), 120, 40);
        let expectations = [
            (Section::Home, "Frontend Developer"),
            (Section::Projects, "Gaming Chat System"),
            (Section::Skills, "TypeScript"),
            (Section::Contact, "enzo@example.dev"),
        ];
        for (section, needle) in expectations {
            app.set_section(section);
            let screen = draw(&mut app, 120, 40);
            assert!(screen.contains(needle), "{:?} missing {needle}", section);
        }
    }

    #[test]
    fn test_header_records_nav_tabs() {
        let mut app = App::new(&Config::new(), 120, 40);
        draw(&mut app, 120, 40);
        assert_eq!(app.hit_areas.nav_tabs.len(), 4);
        assert!(app.hit_areas.nav_tabs.iter().all(|(_, r)| r.y == 0));
    }

    #[test]
    fn test_chat_overlay_without_key_shows_setup() {
        let mut app = App::new(&Config::new(), 120, 40);
        app.open_chat();
        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("GROQ_API_KEY"));
        assert!(app.hit_areas.quick_questions.is_empty());
    }

    #[test]
    fn test_chat_overlay_shows_greeting_and_chips() {
        let mut config = Config::new();
        config.api_key = Some("gsk_test".to_string());
        let mut app = App::new(&config, 120, 40);
        app.open_chat();

        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("Assistant"));
        assert_eq!(app.hit_areas.quick_questions.len(), 3);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut app = App::new(&Config::new(), 8, 3);
        app.open_chat();
        for section in Section::all() {
            app.set_section(section);
            draw(&mut app, 8, 3);
        }
    }
}
