//! Blocking reqwest transport.

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::{ClientError, Result};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Transport that talks to a real server over HTTP/1.1.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `base_url`. `None` disables the request timeout.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Transport(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base path, percent-encoding each one.
    ///
    /// `.` and `..` are refused: URL parsing collapses them even when
    /// percent-encoded, so the request would reach a different resource.
    fn url_for(&self, segments: &[String]) -> Result<Url> {
        if let Some(segment) = segments.iter().find(|s| matches!(s.as_str(), "." | "..")) {
            return Err(ClientError::Transport(format!(
                "'{segment}' cannot be sent as a URL path segment"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Transport(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.segments)?;
        tracing::debug!("{} {}", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };

        let builder = match &request.body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string()),
            None => builder,
        };

        let response = builder
            .send()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(Url::parse(base).expect("base url"), None).expect("transport")
    }

    #[test]
    fn encodes_reserved_characters_in_site() {
        let transport = transport("http://localhost:8080");
        let url = transport
            .url_for(&["credentials".into(), "a b/c?d#e".into()])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/credentials/a%20b%2Fc%3Fd%23e"
        );
    }

    #[test]
    fn refuses_dot_segments_instead_of_hitting_collection() {
        let transport = transport("http://localhost:8080");
        for site in [".", ".."] {
            let err = transport
                .url_for(&["credentials".into(), site.into()])
                .expect_err("dot segment");
            assert!(matches!(err, ClientError::Transport(_)));
        }
        let url = transport
            .url_for(&["credentials".into(), "...".into()])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/credentials/...");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let transport = transport("http://localhost:8080/api/");
        let url = transport
            .url_for(&["credentials".into(), "example.com".into()])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/api/credentials/example.com");
    }

    #[test]
    fn rejects_non_base_url() {
        let url = Url::parse("mailto:someone@example.com").expect("url");
        assert!(HttpTransport::new(url, None).is_err());
    }

    /// Serve exactly one request, returning the raw request text.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).expect("read");
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&raw).to_string()
        });
        (base, handle)
    }

    #[test]
    fn sends_json_body_and_reads_status() {
        let (base, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 32\r\nConnection: close\r\n\r\nCredentials stored successfully.",
        );
        let transport = transport(&base);
        let request = HttpRequest::new(Method::Post, ["credentials"]).with_json(json!({
            "site": "example.com",
            "username": "bob",
            "password": "p@ss",
        }));

        let response = transport.send(&request).expect("response");
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "Credentials stored successfully.");

        let raw = server.join().expect("server thread");
        assert!(raw.starts_with("POST /credentials HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.contains("\"username\":\"bob\""));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let err = transport(&base)
            .send(&HttpRequest::new(Method::Get, ["credentials"]))
            .expect_err("closed port");
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
