//! Application state management.

use mango_core::{Field, Session, Transport};

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Running,
    /// Application should quit.
    Quit,
}

/// Which screen currently receives key presses, topmost first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    /// A notice is waiting to be dismissed.
    Notice,
    /// The detail view is asking a yes/no question.
    Confirm,
    /// The add/edit form is open.
    Editor,
    /// The search overlay is open.
    Search,
    /// The detail view is open.
    Detail,
    /// The site list.
    List,
}

/// Main application model.
pub struct App<T> {
    /// Current application state.
    pub state: AppState,
    /// Credential flows and server replies.
    pub session: Session<T>,
    /// Field of the add/edit form that receives typing.
    pub edit_focus: Field,
    /// Server shown in the title bar.
    pub server_label: String,
}

impl<T: Transport + 'static> App<T> {
    /// Create the app and request the initial site list.
    pub fn new(session: Session<T>, server_label: impl Into<String>) -> Self {
        let mut app = Self {
            state: AppState::Running,
            session,
            edit_focus: Field::Site,
            server_label: server_label.into(),
        };
        app.session.refresh();
        app
    }

    /// Handle finished requests. Called once per frame.
    pub fn tick(&mut self) {
        let had_editor = self.session.editor().is_some();
        self.session.pump();
        if had_editor && self.session.editor().is_none() {
            self.edit_focus = Field::Site;
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.notice().is_some() {
            Screen::Notice
        } else if self
            .session
            .detail()
            .is_some_and(|d| d.confirmation().is_some())
        {
            Screen::Confirm
        } else if self.session.editor().is_some() {
            Screen::Editor
        } else if self.session.search().is_some() {
            Screen::Search
        } else if self.session.detail().is_some() {
            Screen::Detail
        } else {
            Screen::List
        }
    }

    pub fn open_add(&mut self) {
        self.session.open_add();
        self.edit_focus = Field::Site;
    }

    pub fn open_update(&mut self) {
        self.session.open_update();
        // The site is fixed when editing.
        self.edit_focus = Field::Username;
    }

    pub fn close_editor(&mut self) {
        self.session.cancel_editor();
        self.edit_focus = Field::Site;
    }

    /// Move focus to the next editable field.
    pub fn focus_next(&mut self) {
        self.edit_focus = self.step_focus(Field::next);
    }

    /// Move focus to the previous editable field.
    pub fn focus_previous(&mut self) {
        self.edit_focus = self.step_focus(Field::previous);
    }

    fn step_focus(&self, step: fn(Field) -> Field) -> Field {
        let Some(editor) = self.session.editor() else {
            return self.edit_focus;
        };
        let mut field = step(self.edit_focus);
        while !editor.is_editable(field) {
            field = step(field);
        }
        field
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quit;
    }
}
