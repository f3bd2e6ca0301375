//! Shared data types for the application.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored password credential, keyed by site.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub site: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        site: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep plaintext passwords out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /credentials`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    pub site: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of `PUT /credentials/{site}`. The site travels in the path.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Detail record returned by `GET /credentials/{site}`.
///
/// The server encodes its record without JSON tags, so keys are PascalCase.
#[derive(Deserialize)]
pub(crate) struct CredentialRecord {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Sort site names case-insensitively, breaking ties by ordinal order.
pub fn sort_sites(sites: &mut [String]) {
    sites.sort_by_cached_key(|site| (site.to_lowercase(), site.clone()));
}

/// An input field of the add/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Site,
    Username,
    Password,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Site, Field::Username, Field::Password];

    pub fn label(self) -> &'static str {
        match self {
            Field::Site => "Website",
            Field::Username => "Username",
            Field::Password => "Password",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Field::Site => Field::Username,
            Field::Username => Field::Password,
            Field::Password => Field::Site,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Site => Field::Password,
            Field::Username => Field::Site,
            Field::Password => Field::Username,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message surfaced to the user, the terminal form of a message box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Describe a failed request, prefixed with what was being attempted.
    pub fn failure(action: &str, err: &ClientError) -> Self {
        let level = match err {
            ClientError::Transport(_) => NoticeLevel::Error,
            ClientError::Server { .. } | ClientError::Parse(_) => NoticeLevel::Warning,
        };
        Self {
            level,
            title: err.title().to_string(),
            message: format!("{action}. {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_sites_ignoring_case() {
        let mut sites = vec!["Zeta".to_string(), "alpha".into(), "Beta".into()];
        sort_sites(&mut sites);
        assert_eq!(sites, ["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn case_only_duplicates_have_stable_order() {
        let mut sites = vec!["mail.com".to_string(), "Mail.com".into(), "a.org".into()];
        sort_sites(&mut sites);
        assert_eq!(sites, ["a.org", "Mail.com", "mail.com"]);
    }

    #[test]
    fn debug_output_redacts_password() {
        let credential = Credential::new("example.com", "bob", "p@ss");
        let debug = format!("{credential:?}");
        assert!(debug.contains("bob"));
        assert!(!debug.contains("p@ss"));
    }

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(Field::Password.next(), Field::Site);
        assert_eq!(Field::Site.previous(), Field::Password);
    }

    #[test]
    fn failure_notice_prefixes_action() {
        let notice = Notice::failure(
            "Failed to fetch passwords",
            &ClientError::Server {
                status: 404,
                body: "Credentials not found".into(),
            },
        );
        assert_eq!(notice.title, "Server Error");
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.starts_with("Failed to fetch passwords. Status: 404"));
    }
}
