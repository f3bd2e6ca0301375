//! Credential detail view with reveal and delete.

use super::FlowId;
use crate::client::ApiCall;
use crate::models::{Credential, Notice};
use crate::Result;

/// Placeholder shown while the credential is being fetched.
pub const LOADING_TEXT: &str = "Loading...";
/// Fixed-width mask; never derived from the password length.
pub const PASSWORD_MASK: &str = "******";

/// A yes/no question the detail view is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Reveal,
    Delete,
}

pub struct DetailFlow {
    id: FlowId,
    site: String,
    credential: Option<Credential>,
    revealed: bool,
    confirmation: Option<Confirmation>,
    deleting: bool,
}

impl DetailFlow {
    /// Open a detail view for `site`. Pair with [`DetailFlow::fetch_call`].
    pub fn new(id: FlowId, site: impl Into<String>) -> Self {
        Self {
            id,
            site: site.into(),
            credential: None,
            revealed: false,
            confirmation: None,
            deleting: false,
        }
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn fetch_call(&self) -> ApiCall {
        ApiCall::Get(self.site.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn username_text(&self) -> &str {
        match &self.credential {
            Some(credential) => credential.username.as_str(),
            None => LOADING_TEXT,
        }
    }

    pub fn password_text(&self) -> &str {
        match &self.credential {
            Some(credential) if self.revealed => credential.password.as_str(),
            Some(_) => PASSWORD_MASK,
            None => LOADING_TEXT,
        }
    }

    /// Apply the fetch reply. An error means the view should close.
    pub fn on_fetched(&mut self, result: Result<Credential>) -> std::result::Result<(), Notice> {
        match result {
            Ok(credential) => {
                self.credential = Some(credential);
                self.revealed = false;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to fetch credential details for {}: {}", self.site, e);
                Err(Notice::failure("Failed to fetch credential details", &e))
            }
        }
    }

    /// Whether update and delete may be offered.
    pub fn accepts_actions(&self) -> bool {
        self.is_loaded() && !self.deleting && self.confirmation.is_none()
    }

    /// Hide the password, or ask before showing it.
    pub fn toggle_password(&mut self) {
        if !self.is_loaded() || self.confirmation.is_some() {
            return;
        }
        if self.revealed {
            self.revealed = false;
        } else {
            self.confirmation = Some(Confirmation::Reveal);
        }
    }

    /// Ask before deleting.
    pub fn request_delete(&mut self) {
        if self.accepts_actions() {
            self.confirmation = Some(Confirmation::Delete);
        }
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        self.confirmation
    }

    /// Title and question for the pending confirmation.
    pub fn prompt(&self) -> Option<(&'static str, String)> {
        self.confirmation.map(|confirmation| match confirmation {
            Confirmation::Reveal => (
                "Show Password",
                "Are you sure you want to show the password in plain text?".to_string(),
            ),
            Confirmation::Delete => (
                "Confirm Delete",
                format!(
                    "Are you sure you want to delete the credentials for {}?",
                    self.site
                ),
            ),
        })
    }

    /// Answer the pending confirmation. Returns a call to issue, if any.
    pub fn answer(&mut self, accepted: bool) -> Option<ApiCall> {
        let confirmation = self.confirmation.take()?;
        if !accepted {
            return None;
        }
        match confirmation {
            Confirmation::Reveal => {
                self.revealed = true;
                None
            }
            Confirmation::Delete => {
                self.deleting = true;
                Some(ApiCall::Delete(self.site.clone()))
            }
        }
    }

    /// Apply the delete reply. On error the view stays open.
    pub fn on_deleted(&mut self, result: Result<()>) -> std::result::Result<(), Notice> {
        self.deleting = false;
        match result {
            Ok(()) => {
                tracing::info!("Deleted credentials for {}", self.site);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to delete credentials for {}: {}", self.site, e);
                Err(Notice::error(
                    "Error",
                    format!("Failed to delete credentials: {e}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;

    fn loaded() -> DetailFlow {
        let mut flow = DetailFlow::new(FlowId(1), "example.com");
        flow.on_fetched(Ok(Credential::new("example.com", "bob", "correct horse")))
            .expect("loaded");
        flow
    }

    #[test]
    fn shows_placeholders_while_loading() {
        let flow = DetailFlow::new(FlowId(1), "example.com");
        assert_eq!(flow.username_text(), LOADING_TEXT);
        assert_eq!(flow.password_text(), LOADING_TEXT);
        assert_eq!(flow.fetch_call(), ApiCall::Get("example.com".into()));
    }

    #[test]
    fn mask_does_not_leak_length() {
        let flow = loaded();
        assert_eq!(flow.username_text(), "bob");
        assert_eq!(flow.password_text(), PASSWORD_MASK);
    }

    #[test]
    fn declining_reveal_keeps_mask() {
        let mut flow = loaded();
        flow.toggle_password();
        assert_eq!(flow.confirmation(), Some(Confirmation::Reveal));
        assert!(flow.answer(false).is_none());
        assert_eq!(flow.password_text(), PASSWORD_MASK);
        assert!(flow.confirmation().is_none());
    }

    #[test]
    fn accepting_reveal_shows_exact_password() {
        let mut flow = loaded();
        flow.toggle_password();
        flow.answer(true);
        assert_eq!(flow.password_text(), "correct horse");
    }

    #[test]
    fn hiding_needs_no_confirmation() {
        let mut flow = loaded();
        flow.toggle_password();
        flow.answer(true);
        flow.toggle_password();
        assert!(flow.confirmation().is_none());
        assert_eq!(flow.password_text(), PASSWORD_MASK);
    }

    #[test]
    fn toggle_is_ignored_while_loading() {
        let mut flow = DetailFlow::new(FlowId(1), "example.com");
        flow.toggle_password();
        assert!(flow.confirmation().is_none());
    }

    #[test]
    fn delete_prompt_names_site() {
        let mut flow = loaded();
        flow.request_delete();
        let (title, message) = flow.prompt().expect("prompt");
        assert_eq!(title, "Confirm Delete");
        assert!(message.contains("example.com"));
        assert_eq!(flow.answer(true), Some(ApiCall::Delete("example.com".into())));
        assert!(flow.is_deleting());
        assert!(!flow.accepts_actions());
    }

    #[test]
    fn declined_delete_issues_nothing() {
        let mut flow = loaded();
        flow.request_delete();
        assert!(flow.answer(false).is_none());
        assert!(!flow.is_deleting());
    }

    #[test]
    fn failed_delete_keeps_view() {
        let mut flow = loaded();
        flow.request_delete();
        flow.answer(true);
        let notice = flow
            .on_deleted(Err(ClientError::Transport("connection refused".into())))
            .expect_err("failure");
        assert_eq!(notice.message, "Failed to delete credentials: connection refused");
        assert!(flow.accepts_actions());
    }

    #[test]
    fn failed_fetch_reports_notice() {
        let mut flow = DetailFlow::new(FlowId(1), "example.com");
        let notice = flow
            .on_fetched(Err(ClientError::Parse(
                "Failed to parse credential details from server response.".into(),
            )))
            .expect_err("failure");
        assert_eq!(notice.title, "Parse Error");
    }
}
