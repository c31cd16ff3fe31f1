//! Service client for the NHN Cloud networking API
//!
//! Wraps a reqwest client with token authentication, URL construction and
//! status-code checking. Each operation issues exactly one HTTP call and
//! returns the raw [`ApiResponse`]; resource modules provide typed
//! extractors over it. Retry and timeout policy belong to the caller and
//! the underlying transport, not to this layer.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying the authentication token
const AUTH_HEADER: &str = "X-Auth-Token";

/// Environment variables read by [`ServiceClient::from_env`]
const ENDPOINT_ENV: &str = "NHN_NETWORK_ENDPOINT";
const TOKEN_ENV: &str = "NHN_TOKEN";

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // Cut on a char boundary at or past the limit
        let end = body
            .char_indices()
            .map(|(i, _)| i)
            .find(|&i| i >= MAX_LOG_BODY_LENGTH)
            .unwrap_or(body.len());
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Raw result of one API call: status, headers and parsed JSON body
///
/// Resource modules extract typed records from this with free functions,
/// e.g. [`crate::routing_tables::extract_routing_table`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Client for one NHN Cloud network service endpoint
///
/// Cheap to clone; safe for concurrent use to the same extent the
/// underlying reqwest client is.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl ServiceClient {
    /// Create a client for the given service endpoint and auth token.
    ///
    /// `endpoint` is the versioned service root, e.g.
    /// `https://kr1-api-network-infrastructure.nhncloudservice.com/v2.0`.
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("nhncloud-networking/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Create a client from `NHN_NETWORK_ENDPOINT` and `NHN_TOKEN`.
    ///
    /// Returns `None` when either variable is missing or the client cannot
    /// be constructed.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV).ok()?;
        let token = std::env::var(TOKEN_ENV).ok()?;
        Self::new(&endpoint, &token).ok()
    }

    /// The service endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a service URL from path segments
    ///
    /// Pure string join of the endpoint and the segments; query strings are
    /// appended by the caller.
    pub fn service_url(&self, segments: &[&str]) -> String {
        let mut url = self.endpoint.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, ok_codes: &[u16]) -> Result<ApiResponse> {
        self.request(Method::GET, url, None, ok_codes).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &str, body: &Value, ok_codes: &[u16]) -> Result<ApiResponse> {
        self.request(Method::POST, url, Some(body), ok_codes).await
    }

    /// Make a PUT request with an optional JSON body
    pub async fn put(
        &self,
        url: &str,
        body: Option<&Value>,
        ok_codes: &[u16],
    ) -> Result<ApiResponse> {
        self.request(Method::PUT, url, body, ok_codes).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, ok_codes: &[u16]) -> Result<ApiResponse> {
        self.request(Method::DELETE, url, None, ok_codes).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        ok_codes: &[u16],
    ) -> Result<ApiResponse> {
        tracing::debug!("{} {}", method, url);

        let method_name = method_name(&method);
        let mut request = self
            .http
            .request(method, url)
            .header(AUTH_HEADER, &self.token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status_allowed(status, ok_codes) {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(Error::UnexpectedStatus {
                method: method_name,
                url: url.to_string(),
                status,
                body: text,
            });
        }

        // Delete and detach operations may answer with an empty body
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::decode("response body", e.to_string()))?
        };

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Whether a status code is acceptable for the operation
///
/// An empty allowed set means any 2xx code is acceptable.
fn status_allowed(status: StatusCode, ok_codes: &[u16]) -> bool {
    if ok_codes.is_empty() {
        status.is_success()
    } else {
        ok_codes.contains(&status.as_u16())
    }
}

fn method_name(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        _ => "OTHER",
    }
}
