use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
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
        AppEvent::Resize => app.log.scroll_to_bottom(),
        AppEvent::Tick => app.tick(),
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
        InputMode::PickingFile => handle_picker_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('u') | KeyCode::Char('o') => app.open_file_picker(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('i') | KeyCode::Tab => {
            if app.chat_enabled {
                app.set_chat_enabled(true);
            }
        }

        KeyCode::Char('j') | KeyCode::Down => app.log.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.log.scroll_up(1),
        KeyCode::PageDown => app.log.scroll_down(10),
        KeyCode::PageUp => app.log.scroll_up(10),
        KeyCode::Char('g') => app.log.scroll_to_top(),
        KeyCode::Char('G') => app.log.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_message(),
        _ => edit_line(&mut app.chat_input, &mut app.chat_cursor, key.code),
    }
}

fn handle_picker_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_file_picker(),
        KeyCode::Enter => app.submit_file_picker(),
        _ => edit_line(&mut app.path_input, &mut app.path_cursor, key.code),
    }
}

/// Single-line editing shared by the chat box and the path prompt
fn edit_line(input: &mut String, cursor: &mut usize, code: KeyCode) {
    match code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(input.chars().count()),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.log.scroll_down(3),
        MouseEventKind::ScrollUp => app.log.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::*;
    use crate::mock_backend::{MockBackend, MockConfig};

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_edit_line_is_utf8_safe() {
        let mut input = String::new();
        let mut cursor = 0;
        for c in "héllo".chars() {
            edit_line(&mut input, &mut cursor, KeyCode::Char(c));
        }
        edit_line(&mut input, &mut cursor, KeyCode::Home);
        edit_line(&mut input, &mut cursor, KeyCode::Right);
        edit_line(&mut input, &mut cursor, KeyCode::Delete);
        assert_eq!(input, "hllo");
        edit_line(&mut input, &mut cursor, KeyCode::Char('é'));
        edit_line(&mut input, &mut cursor, KeyCode::End);
        edit_line(&mut input, &mut cursor, KeyCode::Backspace);
        assert_eq!(input, "héll");
        assert_eq!(cursor, 4);
    }

    #[tokio::test]
    async fn test_keys_drive_picker_and_chat() {
        let mock = MockBackend::start(MockConfig::default()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "guide.pdf");
        let mut app = app_for(&mock.url());

        // Chat box cannot be focused before an upload
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.input_mode, InputMode::PickingFile);
        type_str(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter);
        app.settle().await;
        assert_eq!(app.file_label, "guide.pdf");
        assert_eq!(app.input_mode, InputMode::Editing);

        type_str(&mut app, "what is it?");
        press(&mut app, KeyCode::Enter);
        app.settle().await;
        assert_eq!(mock.questions(), vec!["what is it?".to_string()]);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('r'));
        app.settle().await;
        assert!(app.picker_enabled);
        assert_eq!(mock.hits().reset, 1);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app_for("http://127.0.0.1:1");
        app.open_file_picker();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }
}
