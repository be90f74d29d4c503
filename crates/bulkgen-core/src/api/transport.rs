//! Blocking HTTP transport seam and its libcurl implementation.

use std::time::Duration;

use crate::config::HttpConfig;
use crate::logging::redact_url;

/// HTTP verbs used by the bulk endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully-resolved request handed to a transport.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: url::Url,
    /// JSON-encoded body, if any.
    pub body: Option<Vec<u8>>,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &redact_url(self.url.as_str()))
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Raw response: status code and body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// The request never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Performs one HTTP exchange. Runs in the current thread; the client calls it from
/// `spawn_blocking`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// libcurl-backed transport (one Easy handle per request).
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
}

impl CurlTransport {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        }
    }
}

impl Transport for CurlTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut body_out: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(request.url.as_str())?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.username(&request.username)?;
        easy.password(&request.password)?;

        match (request.method, request.body.as_deref()) {
            (Method::Get, _) => easy.get(true)?,
            (Method::Post, body) => {
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
            }
            (method, Some(body)) => {
                easy.custom_request(method.as_str())?;
                easy.post_fields_copy(body)?;
            }
            (method, None) => easy.custom_request(method.as_str())?,
        }

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        // Suppress 100-continue; the API answers directly.
        list.append("Expect:")?;
        if request.body.is_some() {
            list.append("Content-Type: application/json")?;
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body_out.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(
            method = request.method.as_str(),
            url = %redact_url(request.url.as_str()),
            status,
            "http exchange"
        );
        Ok(HttpResponse {
            status,
            body: body_out,
        })
    }
}
