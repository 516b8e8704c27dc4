//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use url::Url;

use crate::error::{map_error, parse_retry_after, ApiError, Error, ErrorBody, Result};

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "https://api.xeroml.com";

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "XEROML_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "XEROML_BASE_URL";

/// Environment variable overriding the timeout, in milliseconds.
pub const TIMEOUT_MS_ENV: &str = "XEROML_TIMEOUT_MS";

const API_KEY_HEADER: &str = "x-api-key";

/// XeroML API client.
///
/// Cheap to clone; clones share one connection pool. Sessions created from
/// a client hold a clone of it.
///
/// # Example
///
/// ```no_run
/// use xeroml::{ParseOptions, XeroMlClient};
///
/// # async fn example() -> xeroml::Result<()> {
/// let client = XeroMlClient::builder().api_key("xml_live_...").build()?;
///
/// let graph = client.parse("Book me a flight to Lisbon", ParseOptions::default()).await?;
/// println!("{}", graph.root_goal);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct XeroMlClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client, carrying the API key as a default header.
    http: reqwest::Client,
    /// Base URL without trailing slashes.
    base_url: String,
    /// Request timeout.
    timeout: Duration,
}

impl XeroMlClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client configured from `XEROML_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.inner.base_url, path)).map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::GET, path, |request| request).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        self.execute(Method::GET, path, |request| request.query(query))
            .await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.execute(Method::POST, path, |request| request.json(body))
            .await
    }

    /// Send one request and decode its response.
    ///
    /// Every call to the service goes through here. The timeout covers the
    /// whole exchange, body included.
    async fn execute<T, F>(&self, method: Method, path: &str, prepare: F) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path)?;
        tracing::debug!(%method, path, "Sending request");

        let started = Instant::now();
        let request = prepare(self.inner.http.request(method, url)).timeout(self.inner.timeout);
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            path,
            "Received response"
        );

        if status.is_success() {
            self.decode(status, response).await
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Decode a successful response body.
    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> Result<T> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Undecodable response body");
            Error::Server(ApiError {
                status: status.as_u16(),
                code: "invalid_response".to_string(),
                message: format!("Failed to decode response: {}", e),
                request_id: String::new(),
                details: None,
            })
        })
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        // Only unparseable JSON loses the body; mistyped fields drop one by one
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .map(ErrorBody::from_value),
            Err(e) if e.is_timeout() => return transport_error(e),
            Err(_) => None,
        };
        let body = body.unwrap_or_else(|| {
            ErrorBody::from_message(status.canonical_reason().unwrap_or("Error"))
        });

        let error = map_error(status.as_u16(), &body, retry_after);
        tracing::warn!(
            status = status.as_u16(),
            code = error.code().unwrap_or_default(),
            request_id = error.request_id().unwrap_or_default(),
            "Request failed"
        );
        error
    }
}

impl fmt::Debug for XeroMlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XeroMlClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

/// Convert a failure that produced no HTTP response.
fn transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        tracing::warn!(error = %error, "Request timed out");
        map_error(
            504,
            &ErrorBody::new("timeout", "Request timed out."),
            None,
        )
    } else {
        Error::Http(error)
    }
}

/// Builder for creating an XeroMlClient.
#[derive(Clone, Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    invalid_timeout: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded from `XEROML_API_KEY`, `XEROML_BASE_URL` and
    /// `XEROML_TIMEOUT_MS`. Setters called afterwards take precedence.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::new();
        builder.api_key = lookup(API_KEY_ENV);
        builder.base_url = lookup(BASE_URL_ENV);

        if let Some(raw) = lookup(TIMEOUT_MS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => builder.timeout = Some(Duration::from_millis(ms)),
                Err(_) => builder.invalid_timeout = Some(raw),
            }
        }
        builder
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL for the service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.invalid_timeout = None;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<XeroMlClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("apiKey is required".to_string()))?;

        if let Some(raw) = self.invalid_timeout {
            return Err(Error::Config(format!(
                "{} must be a whole number of milliseconds, got {:?}",
                TIMEOUT_MS_ENV, raw
            )));
        }

        // Strip trailing slashes so base + "/v1/..." never doubles up
        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Url::parse(&base_url)?;

        let mut key_value = HeaderValue::from_str(&api_key)
            .map_err(|_| Error::Config("apiKey is not a valid header value".to_string()))?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_value);

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("xeroml-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(XeroMlClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            }),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
