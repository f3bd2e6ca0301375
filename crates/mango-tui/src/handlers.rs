//! Keyboard event handling.

use crate::app::{App, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mango_core::Transport;

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return true;
    }

    match app.screen() {
        Screen::Notice => handle_notice_key(app, key),
        Screen::Confirm => handle_confirm_key(app, key),
        Screen::Editor => handle_editor_key(app, key),
        Screen::Search => handle_search_key(app, key),
        Screen::Detail => handle_detail_key(app, key),
        Screen::List => handle_list_key(app, key),
    }
}

fn handle_notice_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.session.dismiss_notice();
    }
    false
}

fn handle_confirm_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.session.answer(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.session.answer(false),
        _ => {}
    }
    false
}

fn handle_editor_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.close_editor(),
        KeyCode::Enter => app.session.submit_editor(),
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
        KeyCode::Backspace => app.session.edit_pop(app.edit_focus),
        KeyCode::Char(c) => app.session.edit_push(app.edit_focus, c),
        _ => {}
    }
    false
}

fn handle_search_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.session.close_search(),
        KeyCode::Enter => app.session.choose_search_hit(),
        KeyCode::Up => app.session.search_up(),
        KeyCode::Down => app.session.search_down(),
        KeyCode::Char(c) => app.session.search_push(c),
        KeyCode::Backspace => app.session.search_pop(),
        _ => {}
    }
    false
}

fn handle_detail_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.session.close_detail(),
        KeyCode::Char('s') | KeyCode::Char(' ') => app.session.toggle_password(),
        KeyCode::Char('u') | KeyCode::Char('e') => app.open_update(),
        KeyCode::Char('d') | KeyCode::Delete => app.session.request_delete(),
        _ => {}
    }
    false
}

fn handle_list_key<T: Transport + 'static>(app: &mut App<T>, key: KeyEvent) -> bool {
    // Ctrl+P to search
    if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.session.open_search();
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            true
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.session.list_mut().move_down();
            false
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.session.list_mut().move_up();
            false
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.session.list_mut().move_first();
            false
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.session.list_mut().move_last();
            false
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            app.session.open_selected();
            false
        }
        KeyCode::Char('a') => {
            app.open_add();
            false
        }
        KeyCode::Char('r') | KeyCode::F(5) => {
            app.session.refresh();
            false
        }
        KeyCode::Char('/') => {
            app.session.open_search();
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use mango_core::flows::detail::PASSWORD_MASK;
    use mango_core::transport::memory::InMemoryBackend;
    use mango_core::transport::Method;
    use mango_core::{CredentialClient, Execution, Session};
    use std::sync::Arc;

    fn app_with(backend: &Arc<InMemoryBackend>) -> App<Arc<InMemoryBackend>> {
        let session = Session::new(CredentialClient::new(Arc::clone(backend)), Execution::Inline);
        let mut app = App::new(session, "http://localhost:8080");
        app.tick();
        app
    }

    fn press(app: &mut App<Arc<InMemoryBackend>>, code: KeyCode) -> bool {
        let quit = handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
        app.tick();
        quit
    }

    fn type_text(app: &mut App<Arc<InMemoryBackend>>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn add_credential_from_keyboard() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut app = app_with(&backend);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "bob");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "p@ss");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Notice);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::List);
        assert_eq!(app.session.list().sites(), ["example.com"]);
        assert_eq!(backend.count(Method::Get, &["credentials"]), 2);
    }

    #[test]
    fn reveal_requires_yes() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.insert("example.com", "bob", "p@ss");
        let mut app = app_with(&backend);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Detail);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen(), Screen::Confirm);
        press(&mut app, KeyCode::Char('n'));
        let detail = app.session.detail().expect("detail");
        assert_eq!(detail.password_text(), PASSWORD_MASK);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.session.detail().expect("detail").password_text(), "p@ss");
    }

    #[test]
    fn delete_from_detail_view() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.insert("foo.com", "bob", "p@ss");
        let mut app = app_with(&backend);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.screen(), Screen::List);
        assert!(app.session.list().sites().is_empty());
        assert!(!backend.contains("foo.com"));
    }

    #[test]
    fn typing_q_in_form_does_not_quit() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut app = app_with(&backend);
        press(&mut app, KeyCode::Char('a'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.session.editor().expect("form").value(mango_core::Field::Site), "q");
        assert_eq!(app.state, AppState::Running);
    }

    #[test]
    fn q_quits_from_list() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut app = app_with(&backend);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_form() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut app = app_with(&backend);
        press(&mut app, KeyCode::Char('a'));
        let quit = handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }
}
