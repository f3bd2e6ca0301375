//! UI-agnostic flows: the site list, the add/edit form and the detail view.
//!
//! Flows hold view state and turn user intents into [`crate::ApiCall`]s; the
//! [`crate::Session`] issues the calls and feeds replies back.

pub mod detail;
pub mod edit;
pub mod list;
pub mod search;

pub use detail::{Confirmation, DetailFlow};
pub use edit::{EditFlow, EditMode, Strength};
pub use list::{Activation, ListView};
pub use search::{SearchHit, SiteSearch};

/// Identity of one opened flow instance.
///
/// A fresh id is issued every time a dialog opens, so replies addressed to a
/// closed instance can be told apart from replies for its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(pub(crate) u64);
