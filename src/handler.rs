use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::section::Section;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(w, h) => app.resize(w, h),
        AppEvent::Tick => app.tick(),
        AppEvent::Reveal => app.step_reveal(),
    }
    app.poll_reply().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Section navigation
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(section) = Section::from_digit(c) {
                app.set_section(section);
            }
        }
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => app.set_section(app.section.next()),
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => {
            app.set_section(app.section.prev())
        }

        // Home call-to-action buttons
        KeyCode::Char('p') if app.section == Section::Home => app.set_section(Section::Projects),
        KeyCode::Char('m') if app.section == Section::Home => app.set_section(Section::Contact),

        // Chat overlay
        KeyCode::Char('c') | KeyCode::Char('i') => app.open_chat(),
        KeyCode::Esc if app.chat_open => app.close_chat(),
        KeyCode::Up | KeyCode::Char('k') if app.chat_open => app.scroll_chat_up(1),
        KeyCode::Down | KeyCode::Char('j') if app.chat_open => app.scroll_chat_down(1),
        KeyCode::F(n @ 1..=3) if app.chat_open => app.ask_quick(n as usize - 1),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    // Input stays disabled while waiting on the service
    let editable = !app.chat.is_awaiting_reply();

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.send_message(),
        KeyCode::F(n @ 1..=3) => app.ask_quick(n as usize - 1),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::PageUp => app.scroll_chat_up(10),
        KeyCode::PageDown => app.scroll_chat_down(10),
        KeyCode::Backspace if editable => app.chat.backspace(),
        KeyCode::Delete if editable => app.chat.delete(),
        KeyCode::Left if editable => app.chat.cursor_left(),
        KeyCode::Right if editable => app.chat.cursor_right(),
        KeyCode::Home if editable => app.chat.cursor_home(),
        KeyCode::End if editable => app.chat.cursor_end(),
        KeyCode::Char(c) if editable => app.chat.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let tab = app
                .hit_areas
                .nav_tabs
                .iter()
                .find(|(_, rect)| point_in_rect(x, y, *rect))
                .map(|(section, _)| *section);
            if let Some(section) = tab {
                app.set_section(section);
                return;
            }

            if app.chat_open {
                let chip = app
                    .hit_areas
                    .quick_questions
                    .iter()
                    .position(|rect| point_in_rect(x, y, *rect));
                if let Some(idx) = chip {
                    app.ask_quick(idx);
                }
            }
        }
        MouseEventKind::ScrollUp if app.chat_open => {
            if point_in_rect(x, y, app.hit_areas.chat_messages) {
                app.scroll_chat_up(3);
            }
        }
        MouseEventKind::ScrollDown if app.chat_open => {
            if point_in_rect(x, y, app.hit_areas.chat_messages) {
                app.scroll_chat_down(3);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn new_app() -> App {
        App::new(&Config::new(), 80, 24)
    }

    #[tokio::test]
    async fn test_digit_keys_switch_sections() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.section, Section::Skills);
        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.section, Section::Contact);
        handle_event(&mut app, key(KeyCode::BackTab)).await.unwrap();
        assert_eq!(app.section, Section::Skills);
    }

    #[tokio::test]
    async fn test_home_shortcuts_only_on_home() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('p'))).await.unwrap();
        assert_eq!(app.section, Section::Projects);
        handle_event(&mut app, key(KeyCode::Char('m'))).await.unwrap();
        assert_eq!(app.section, Section::Projects);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);

        let mut app = new_app();
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_event(&mut app, ctrl_c).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_typing_goes_to_chat_input() {
        let mut config = Config::new();
        config.api_key = Some("gsk_test".to_string());
        let mut app = App::new(&config, 80, 24);

        handle_event(&mut app, key(KeyCode::Char('c'))).await.unwrap();
        assert!(app.chat_open);
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "q1".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(app.chat.input, "q1");
        assert!(!app.should_quit);
        assert_eq!(app.section, Section::Home);

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(!app.chat_open);
    }

    #[tokio::test]
    async fn test_input_frozen_while_awaiting_reply() {
        let mut config = Config::new();
        config.api_key = Some("gsk_test".to_string());
        let mut app = App::new(&config, 80, 24);
        handle_event(&mut app, key(KeyCode::Char('c'))).await.unwrap();

        app.chat.input = "hi".to_string();
        app.chat.submit().unwrap();
        app.chat.input = "draft".to_string();
        app.chat.cursor = 5;

        for code in [
            KeyCode::Backspace,
            KeyCode::Left,
            KeyCode::Delete,
            KeyCode::Home,
            KeyCode::Delete,
            KeyCode::End,
            KeyCode::Char('x'),
        ] {
            handle_event(&mut app, key(code)).await.unwrap();
        }

        assert!(app.chat.is_awaiting_reply());
        assert_eq!(app.chat.input, "draft");
        assert_eq!(app.chat.cursor, 5);
    }

    #[tokio::test]
    async fn test_chat_without_key_stays_normal() {
        let mut app = new_app();
        handle_event(&mut app, key(KeyCode::Char('c'))).await.unwrap();
        assert!(app.chat_open);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_click_nav_tab() {
        let mut app = new_app();
        app.hit_areas.nav_tabs = vec![
            (Section::Home, Rect::new(10, 0, 6, 1)),
            (Section::Contact, Rect::new(20, 0, 9, 1)),
        ];
        handle_event(&mut app, click(22, 0)).await.unwrap();
        assert_eq!(app.section, Section::Contact);
        handle_event(&mut app, click(5, 0)).await.unwrap();
        assert_eq!(app.section, Section::Contact);
    }

    #[tokio::test]
    async fn test_resize_event() {
        let mut app = new_app();
        handle_event(&mut app, AppEvent::Resize(60, 20)).await.unwrap();
        assert_eq!(app.rain.column_count(), 30);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(point_in_rect(2, 3, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(2, 5, rect));
    }
}
