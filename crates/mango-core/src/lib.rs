//! Core client and flow state for Password Mango.
//!
//! This crate provides the HTTP credential client, the completion dispatcher
//! and the UI-agnostic flows driven by the terminal frontend.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod flows;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{ApiCall, ApiReply, CredentialClient};
pub use dispatch::{Completion, Dispatcher, Execution, Ticket};
pub use error::{ClientError, Result, ValidationError};
pub use flows::{DetailFlow, EditFlow, EditMode, FlowId, ListView, SiteSearch};
pub use models::{Credential, Field, Notice, NoticeLevel};
pub use session::Session;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};
