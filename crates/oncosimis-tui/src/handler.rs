use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use oncosimis_core::Action;
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Session(action) => {
            app.dispatch(action);
        }
    }
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

        KeyCode::Char('i') => {
            app.focus = FocusPane::Chat;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Tab => app.toggle_focus(),

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Chat => app.scroll_down(),
            FocusPane::Files => app.files_nav_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Chat => app.scroll_up(),
            FocusPane::Files => app.files_nav_up(),
        },
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_to_bottom(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        KeyCode::Enter | KeyCode::Char('d') if app.focus == FocusPane::Files => {
            app.download_selected();
        }
        KeyCode::Enter => app.input_mode = InputMode::Editing,

        KeyCode::Char('C') => {
            app.dispatch(Action::Clear);
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));
    let in_files = app.files_area.is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => {
            for _ in 0..3 {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp if in_chat => {
            for _ in 0..3 {
                app.scroll_up();
            }
        }
        MouseEventKind::ScrollDown if in_files => app.files_nav_down(),
        MouseEventKind::ScrollUp if in_files => app.files_nav_up(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncosimis_core::{BackendClient, Connectivity};
    use std::path::PathBuf;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        App::new(client, PathBuf::from("."), None, tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn editing_is_utf8_safe() {
        let mut app = app();
        type_text(&mut app, "AcceTT®");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "AcceT®");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "cceT");
    }

    #[test]
    fn escape_then_q_quits() {
        let mut app = app();
        type_text(&mut app, "q");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_while_editing() {
        let mut app = app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn enter_sends_when_online() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Session(Action::HealthPolled(Connectivity::ONLINE)));
        type_text(&mut app, "What is BacSec?");

        press(&mut app, KeyCode::Enter);

        assert!(app.input.is_empty());
        assert_eq!(app.session.transcript().len(), 1);
        assert!(app.session.awaiting_reply());
    }

    #[test]
    fn capital_c_clears_transcript() {
        let mut app = app();
        type_text(&mut app, "hello");
        press(&mut app, KeyCode::Enter); // offline: adds a warning
        assert_eq!(app.session.transcript().len(), 1);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('C'));
        assert!(app.session.transcript().is_empty());
    }
}
