//! In-memory transports for tests.

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::{ClientError, Result};
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

const MAX_SITE_LENGTH: usize = 255;
const MAX_USERNAME_LENGTH: usize = 255;
const MAX_PASSWORD_LENGTH: usize = 1000;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Transport that records requests and replays queued outcomes in order.
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<VecDeque<Result<HttpResponse>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        lock(&self.queued).push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure for the next request.
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.queued).push_back(Err(ClientError::Transport(message.into())));
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.sent).clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        lock(&self.sent).push(request.clone());
        lock(&self.queued).pop_front().unwrap_or_else(|| {
            Err(ClientError::Transport(
                "scripted transport has no queued responses".into(),
            ))
        })
    }
}

#[derive(Deserialize)]
struct CreatePayload {
    #[serde(default)]
    site: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct UpdatePayload {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Default)]
struct BackendState {
    // Insertion order, so list responses come back unsorted.
    records: Vec<(String, String, String)>,
    failures: VecDeque<HttpResponse>,
    sent: Vec<HttpRequest>,
}

impl BackendState {
    fn position(&self, site: &str) -> Option<usize> {
        self.records.iter().position(|(s, _, _)| s == site)
    }
}

/// A small stand-in for the credential server.
///
/// Mirrors the server's responses: `201` on create, `409` for an existing
/// site, `404` for a missing one, and PascalCase keys on the detail record.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a credential without going through the API.
    pub fn insert(&self, site: &str, username: &str, password: &str) {
        let mut state = lock(&self.state);
        match state.position(site) {
            Some(index) => state.records[index] = (site.into(), username.into(), password.into()),
            None => state
                .records
                .push((site.into(), username.into(), password.into())),
        }
    }

    /// Answer the next request with `status` and `body` instead of serving it.
    pub fn fail_next(&self, status: u16, body: impl Into<String>) {
        lock(&self.state)
            .failures
            .push_back(HttpResponse::new(status, body));
    }

    pub fn contains(&self, site: &str) -> bool {
        lock(&self.state).position(site).is_some()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.state).sent.clone()
    }

    /// Number of requests matching `method` and `segments`.
    pub fn count(&self, method: Method, segments: &[&str]) -> usize {
        lock(&self.state)
            .sent
            .iter()
            .filter(|r| r.method == method && r.segments == segments)
            .count()
    }
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::new(400, format!("{message}\n"))
}

fn not_found() -> HttpResponse {
    HttpResponse::new(404, "Credentials not found\n")
}

fn serve(state: &mut BackendState, request: &HttpRequest) -> HttpResponse {
    let site = match request.segments.as_slice() {
        [root] if root == "credentials" => None,
        [root, site] if root == "credentials" => Some(site.trim().to_string()),
        _ => return HttpResponse::new(404, "404 page not found\n"),
    };

    match (request.method, site) {
        (Method::Get, None) => {
            let sites: Vec<&str> = state.records.iter().map(|(s, _, _)| s.as_str()).collect();
            HttpResponse::new(200, format!("{}\n", json!(sites)))
        }
        (Method::Get, Some(site)) => match state.position(&site) {
            Some(index) => {
                let (_, username, password) = &state.records[index];
                HttpResponse::new(
                    200,
                    format!("{}\n", json!({ "Username": username, "Password": password })),
                )
            }
            None => not_found(),
        },
        (Method::Post, _) => {
            let Some(payload) = request
                .body
                .clone()
                .and_then(|body| serde_json::from_value::<CreatePayload>(body).ok())
            else {
                return bad_request("Invalid request body");
            };
            let site = payload.site.trim().to_string();
            let username = payload.username.trim().to_string();
            let password = payload.password.trim().to_string();

            if site.is_empty() {
                return bad_request("Site is required and cannot be empty");
            }
            if username.is_empty() {
                return bad_request("Username is required and cannot be empty");
            }
            if password.is_empty() {
                return bad_request("Password is required and cannot be empty");
            }
            if site.len() > MAX_SITE_LENGTH {
                return bad_request("Site must not exceed 255 characters");
            }
            if username.len() > MAX_USERNAME_LENGTH {
                return bad_request("Username must not exceed 255 characters");
            }
            if password.len() > MAX_PASSWORD_LENGTH {
                return bad_request("Password must not exceed 1000 characters");
            }
            if state.position(&site).is_some() {
                return HttpResponse::new(409, "Site already exists. Use PUT to update.\n");
            }

            state.records.push((site, username, password));
            HttpResponse::new(201, "Credentials stored successfully.\n")
        }
        (Method::Put, None) => bad_request("Missing site in URL path for update"),
        (Method::Put, Some(site)) => {
            let Some(payload) = request
                .body
                .clone()
                .and_then(|body| serde_json::from_value::<UpdatePayload>(body).ok())
            else {
                return bad_request("Invalid request body");
            };
            let username = payload.username.trim().to_string();
            let password = payload.password.trim().to_string();
            if username.is_empty() || password.is_empty() {
                return bad_request("username and password required");
            }
            match state.position(&site) {
                Some(index) => {
                    state.records[index] = (site, username, password);
                    HttpResponse::new(200, "Credentials updated successfully.\n")
                }
                None => HttpResponse::new(500, "Failed to update credentials\n"),
            }
        }
        (Method::Delete, None) => bad_request("Missing site in URL path for delete"),
        (Method::Delete, Some(site)) => match state.position(&site) {
            Some(index) => {
                state.records.remove(index);
                HttpResponse::new(200, "Credentials deleted successfully.\n")
            }
            None => not_found(),
        },
    }
}

impl Transport for InMemoryBackend {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut state = lock(&self.state);
        state.sent.push(request.clone());

        if let Some(failure) = state.failures.pop_front() {
            return Ok(failure);
        }
        Ok(serve(&mut state, request))
    }
}
