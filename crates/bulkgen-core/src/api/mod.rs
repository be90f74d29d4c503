//! HTTP client adapter for the content backend.
//!
//! Every call goes through [`ApiClient::request`], which attaches the credential
//! pair, runs the blocking transport on tokio's blocking pool, and normalizes the
//! outcome into either an [`ApiBody`] or an [`ApiError`]. No retries happen here;
//! retrying is a caller decision (see `crate::retry`).

pub mod endpoints;
mod error;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use endpoints::{BrainstormPayload, DirectPayload};
pub use error::{ApiError, FieldError};
pub use transport::{CurlTransport, HttpRequest, HttpResponse, Method, Transport, TransportError};

use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::{BulkgenConfig, Credentials};

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    /// 204, empty body, or a non-JSON success payload.
    Empty,
}

impl ApiBody {
    /// Require a JSON document; `Empty` becomes a `Decode` error.
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            ApiBody::Json(v) => Ok(v),
            ApiBody::Empty => Err(ApiError::Decode {
                message: "expected a JSON body, got an empty response".to_string(),
            }),
        }
    }
}

/// Authenticated client for the bulk API. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client over libcurl using the base URL, credentials and timeouts from config.
    pub fn new(cfg: &BulkgenConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(CurlTransport::new(&cfg.http()));
        Self::with_transport(&cfg.base_url, cfg.credentials.clone(), transport)
    }

    /// Client over an arbitrary transport.
    pub fn with_transport(
        base_url: &str,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidUrl {
            message: format!("{}: {}", base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                message: format!("{} cannot be used as a base URL", base_url),
            });
        }
        Ok(Self {
            base,
            credentials,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL from path segments (each percent-encoded on its own) and
    /// query pairs.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                message: format!("{} cannot be used as a base URL", self.base),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Perform one authenticated request and normalize the result.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<ApiBody, ApiError> {
        let body = match body {
            Some(v) => Some(serde_json::to_vec(v).map_err(|e| ApiError::Decode {
                message: format!("encode request body: {}", e),
            })?),
            None => None,
        };
        let request = HttpRequest {
            method,
            url,
            body,
            username: self.credentials.username.clone(),
            password: self.credentials.password.clone(),
        };
        let transport = Arc::clone(&self.transport);
        let response = tokio::task::spawn_blocking(move || transport.execute(&request))
            .await
            .map_err(|e| ApiError::Network {
                message: format!("request task failed: {}", e),
            })?
            .map_err(|e| ApiError::Network { message: e.0 })?;
        interpret(response)
    }
}

/// Normalize a raw response into the single result shape.
fn interpret(response: HttpResponse) -> Result<ApiBody, ApiError> {
    if !(200..300).contains(&response.status) {
        return Err(ApiError::from_status(response.status, &response.body));
    }
    if response.status == 204 || response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiBody::Empty);
    }
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(v) => Ok(ApiBody::Json(v)),
        Err(_) => Ok(ApiBody::Empty),
    }
}
