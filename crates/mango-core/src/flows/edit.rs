//! Add/edit credential form.

use super::FlowId;
use crate::client::ApiCall;
use crate::error::ValidationError;
use crate::models::{Credential, Field, Notice};
use crate::Result;
use zxcvbn::{zxcvbn, Score};

/// Limits enforced by the server, checked locally to save a round trip.
const MAX_SITE_LENGTH: usize = 255;
const MAX_USERNAME_LENGTH: usize = 255;
const MAX_PASSWORD_LENGTH: usize = 1000;

/// Whether the form creates a new credential or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Add,
    /// The site is fixed; renaming is not supported.
    Edit(String),
}

/// Password strength estimate shown under the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strength {
    /// 0 (very weak) to 4 (very strong).
    pub score: u8,
    pub label: &'static str,
}

/// Outcome of a save reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved; the form should close and the caller refresh.
    Accepted(Notice),
    /// Not saved; the form stays open for a retry.
    Retained(Notice),
}

pub struct EditFlow {
    id: FlowId,
    mode: EditMode,
    site: String,
    username: String,
    password: String,
    saving: bool,
    invalid: Option<Field>,
    error: Option<String>,
}

impl EditFlow {
    pub fn new(id: FlowId, mode: EditMode) -> Self {
        let site = match &mode {
            EditMode::Add => String::new(),
            EditMode::Edit(site) => site.clone(),
        };
        Self {
            id,
            mode,
            site,
            username: String::new(),
            password: String::new(),
            saving: false,
            invalid: None,
            error: None,
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            EditMode::Add => "Add Password",
            EditMode::Edit(_) => "Edit Password",
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Site => &self.site,
            Field::Username => &self.username,
            Field::Password => &self.password,
        }
    }

    /// Whether `field` accepts input. The site is read-only when editing.
    pub fn is_editable(&self, field: Field) -> bool {
        !(field == Field::Site && matches!(self.mode, EditMode::Edit(_)))
    }

    /// Replace the contents of `field`. Ignored for read-only fields.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        if !self.is_editable(field) {
            return false;
        }
        let value = value.into();
        match field {
            Field::Site => self.site = value,
            Field::Username => self.username = value,
            Field::Password => self.password = value,
        }
        if self.invalid == Some(field) {
            self.invalid = None;
        }
        true
    }

    pub fn push_char(&mut self, field: Field, c: char) -> bool {
        let mut value = self.value(field).to_string();
        value.push(c);
        self.set(field, value)
    }

    pub fn pop_char(&mut self, field: Field) -> bool {
        let mut value = self.value(field).to_string();
        value.pop();
        self.set(field, value)
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Field that failed the last validation, if any.
    pub fn invalid_field(&self) -> Option<Field> {
        self.invalid
    }

    /// Last save error, kept on the form until the next attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Build the credential to submit.
    ///
    /// Site and username are trimmed; the password is taken verbatim.
    pub fn validate(&self) -> std::result::Result<Credential, ValidationError> {
        let site = self.site.trim();
        let username = self.username.trim();
        let password = self.password.as_str();

        for (field, value) in [
            (Field::Site, site),
            (Field::Username, username),
            (Field::Password, password),
        ] {
            if value.is_empty() {
                return Err(ValidationError::new(field, "All fields are required."));
            }
        }

        for (field, value, max) in [
            (Field::Site, site, MAX_SITE_LENGTH),
            (Field::Username, username, MAX_USERNAME_LENGTH),
            (Field::Password, password, MAX_PASSWORD_LENGTH),
        ] {
            if value.len() > max {
                return Err(ValidationError::new(
                    field,
                    format!("{field} must not exceed {max} characters."),
                ));
            }
        }

        // URL parsers collapse these, so the site could never be addressed.
        if matches!(site, "." | "..") {
            return Err(ValidationError::new(
                Field::Site,
                "Website cannot be \".\" or \"..\".",
            ));
        }

        Ok(Credential::new(site, username, password))
    }

    /// Validate and produce the call to issue.
    ///
    /// Returns `Ok(None)` while a previous save is still in flight.
    pub fn submit(&mut self) -> std::result::Result<Option<ApiCall>, ValidationError> {
        if self.saving {
            return Ok(None);
        }

        let credential = match self.validate() {
            Ok(credential) => credential,
            Err(e) => {
                self.invalid = Some(e.field);
                return Err(e);
            }
        };

        self.invalid = None;
        self.error = None;
        self.saving = true;
        Ok(Some(match self.mode {
            EditMode::Add => ApiCall::Create(credential),
            EditMode::Edit(_) => ApiCall::Update(credential),
        }))
    }

    /// Apply the reply to a submitted save.
    pub fn on_saved(&mut self, result: Result<()>) -> SaveOutcome {
        self.saving = false;
        match result {
            Ok(()) => {
                tracing::info!("Saved credentials for {}", self.site.trim());
                SaveOutcome::Accepted(Notice::info("Success", "Credentials saved successfully."))
            }
            Err(e) => {
                tracing::warn!("Failed to save credentials for {}: {}", self.site.trim(), e);
                let notice = Notice::failure("Failed to save credentials", &e);
                self.error = Some(notice.message.clone());
                SaveOutcome::Retained(notice)
            }
        }
    }

    /// Strength of the password typed so far.
    pub fn strength(&self) -> Option<Strength> {
        if self.password.is_empty() {
            return None;
        }

        let entropy = zxcvbn(&self.password, &[self.site.trim(), self.username.trim()]);
        let (score, label) = match entropy.score() {
            Score::Zero => (0, "Very Weak"),
            Score::One => (1, "Weak"),
            Score::Two => (2, "Fair"),
            Score::Three => (3, "Strong"),
            Score::Four => (4, "Very Strong"),
            _ => (2, "Unknown"),
        };
        Some(Strength { score, label })
    }
}
