//! Typed operations on the credential server.

use crate::models::{sort_sites, CreateBody, Credential, CredentialRecord, UpdateBody};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::{ClientError, Result};
use serde_json::Value;

const COLLECTION: &str = "credentials";

/// Client for the `/credentials` REST resource.
///
/// Every method is a single blocking round trip. Run them through the
/// [`crate::Dispatcher`] to keep them off the UI thread.
pub struct CredentialClient<T> {
    transport: T,
}

impl<T: Transport> CredentialClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /credentials`, sorted case-insensitively.
    pub fn list(&self) -> Result<Vec<String>> {
        let response = self.send(HttpRequest::new(Method::Get, [COLLECTION]))?;
        if response.status != 200 {
            return Err(server_error(response));
        }

        let not_array =
            || ClientError::Parse("Failed to parse JSON response or it was not a JSON array.".into());
        let value: Value = serde_json::from_str(response.body.trim()).map_err(|_| not_array())?;
        let Value::Array(items) = value else {
            return Err(not_array());
        };

        let mut sites = items
            .into_iter()
            .map(|item| match item {
                Value::String(site) => Ok(site),
                other => Err(ClientError::Parse(format!(
                    "Expected a site name but found {other}."
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        sort_sites(&mut sites);
        Ok(sites)
    }

    /// `GET /credentials/{site}`.
    pub fn get(&self, site: &str) -> Result<Credential> {
        let response = self.send(HttpRequest::new(Method::Get, [COLLECTION, site]))?;
        if response.status != 200 {
            return Err(server_error(response));
        }

        let not_object = || {
            ClientError::Parse("Failed to parse credential details from server response.".into())
        };
        let value: Value = serde_json::from_str(response.body.trim()).map_err(|_| not_object())?;
        if !value.is_object() {
            return Err(not_object());
        }

        let record: CredentialRecord = serde_json::from_value(value)
            .map_err(|e| ClientError::Parse(format!("Invalid credential details: {e}")))?;

        Ok(Credential {
            site: site.to_string(),
            username: record.username,
            password: record.password,
        })
    }

    /// `POST /credentials`. Any 2xx status is success.
    pub fn create(&self, site: &str, username: &str, password: &str) -> Result<()> {
        let body = serde_json::to_value(CreateBody {
            site,
            username,
            password,
        })
        .map_err(|e| ClientError::Parse(e.to_string()))?;

        let response = self.send(HttpRequest::new(Method::Post, [COLLECTION]).with_json(body))?;
        expect_success(response)
    }

    /// `PUT /credentials/{site}`. The site is not repeated in the body.
    pub fn update(&self, site: &str, username: &str, password: &str) -> Result<()> {
        let body = serde_json::to_value(UpdateBody { username, password })
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let response =
            self.send(HttpRequest::new(Method::Put, [COLLECTION, site]).with_json(body))?;
        expect_success(response)
    }

    /// `DELETE /credentials/{site}`. A non-2xx status is reported as an error.
    pub fn delete(&self, site: &str) -> Result<()> {
        let response = self.send(HttpRequest::new(Method::Delete, [COLLECTION, site]))?;
        expect_success(response)
    }

    /// Run a queued call and wrap its outcome.
    pub fn execute(&self, call: &ApiCall) -> ApiReply {
        match call {
            ApiCall::List => ApiReply::Sites(self.list()),
            ApiCall::Get(site) => ApiReply::Credential(self.get(site)),
            ApiCall::Create(c) => ApiReply::Saved(self.create(&c.site, &c.username, &c.password)),
            ApiCall::Update(c) => ApiReply::Saved(self.update(&c.site, &c.username, &c.password)),
            ApiCall::Delete(site) => ApiReply::Deleted(self.delete(site)),
        }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        match self.transport.send(&request) {
            Ok(response) => {
                tracing::debug!(
                    "{} {} -> {}",
                    request.method,
                    request.display_path(),
                    response.status
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", request.method, request.display_path(), e);
                Err(e)
            }
        }
    }
}

fn server_error(response: HttpResponse) -> ClientError {
    ClientError::Server {
        status: response.status,
        body: response.body.trim_end().to_string(),
    }
}

fn expect_success(response: HttpResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(server_error(response))
    }
}

/// A client operation waiting to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Get(String),
    Create(Credential),
    Update(Credential),
    Delete(String),
}

/// Outcome of an [`ApiCall`], shaped by the kind of call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    Sites(Result<Vec<String>>),
    Credential(Result<Credential>),
    Saved(Result<()>),
    Deleted(Result<()>),
}

impl ApiReply {
    /// The reply `call` would produce had it failed with `err`.
    pub fn failed(call: &ApiCall, err: ClientError) -> Self {
        match call {
            ApiCall::List => ApiReply::Sites(Err(err)),
            ApiCall::Get(_) => ApiReply::Credential(Err(err)),
            ApiCall::Create(_) | ApiCall::Update(_) => ApiReply::Saved(Err(err)),
            ApiCall::Delete(_) => ApiReply::Deleted(Err(err)),
        }
    }
}
