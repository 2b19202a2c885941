/*
[INPUT]:  HTTP configuration (base URL, timeouts), optional credentials
[OUTPUT]: Configured reqwest client and single-call request dispatch
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing dispatch/error mapping
*/

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Credentials;
use crate::http::signature::{FORM_CONTENT_TYPE, RequestSigner, canonical_query, form_body};
use crate::http::{BitstampError, Result};

/// Base URL for the Bitstamp REST API
pub const DEFAULT_BASE_URL: &str = "https://www.bitstamp.net";

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
        }
    }

    pub fn method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = BitstampError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            other => Err(BitstampError::Protocol(format!(
                "unsupported HTTP method requested: {other}"
            ))),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// One REST call, described before it is dispatched
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub verb: HttpVerb,
    pub endpoint: String,
    pub query: Vec<(&'static str, String)>,
    pub form: Vec<(&'static str, String)>,
    pub authorized: bool,
}

impl ApiRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            verb: HttpVerb::Get,
            endpoint: endpoint.into(),
            query: Vec::new(),
            form: Vec::new(),
            authorized: false,
        }
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self {
            verb: HttpVerb::Post,
            ..Self::get(endpoint)
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn form(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.form.push((key, value.into()));
        self
    }

    pub fn authorized(mut self) -> Self {
        self.authorized = true;
        self
    }
}

/// Main HTTP client for the Bitstamp API
#[derive(Debug, Clone)]
pub struct BitstampClient {
    http_client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl BitstampClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| BitstampError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&config.base_url)?;
        if base_url.host_str().is_none() {
            return Err(BitstampError::Config(format!(
                "base URL has no host: {}",
                config.base_url
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            credentials: None,
        })
    }

    /// Attach credentials for authorized endpoints
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host as it appears in the signed message (`host` or `host:port`)
    fn domain(&self) -> String {
        let host = self.base_url.host_str().unwrap_or_default();
        match self.base_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Perform exactly one HTTP call and map the JSON response into `T`
    pub(crate) async fn dispatch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let ApiRequest {
            verb,
            endpoint,
            query,
            form,
            authorized,
        } = request;

        let query = canonical_query(&query)?;
        let body = form_body(&form)?;
        let content_type = (!body.is_empty()).then_some(FORM_CONTENT_TYPE);

        // Signing happens before any I/O so missing credentials never reach the wire.
        let mut headers = if authorized {
            let signer = RequestSigner::from_optional(self.credentials.as_ref())?;
            signer
                .auth_headers(verb, &self.domain(), &endpoint, &query, content_type, &body)
                .to_header_map()?
        } else {
            HeaderMap::new()
        };
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        let mut url = self.base_url.join(&endpoint)?;
        if let Some(raw_query) = query.strip_prefix('?') {
            url.set_query(Some(raw_query));
        }

        debug!(method = %verb, %endpoint, authorized, "dispatching request");

        let mut builder = self
            .http_client
            .request(verb.method(), url)
            .headers(headers);
        if content_type.is_some() {
            builder = builder.body(body);
        }

        let transport_error = |source: reqwest::Error| BitstampError::Transport {
            method: verb,
            endpoint: endpoint.clone(),
            source,
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        parse_response(status, &endpoint, &text)
    }
}

fn parse_response<T: DeserializeOwned>(status: StatusCode, endpoint: &str, text: &str) -> Result<T> {
    if status == StatusCode::NOT_FOUND {
        return Err(BitstampError::NotFound {
            endpoint: endpoint.to_string(),
        });
    }

    if !status.is_success() {
        let message = error_reason(text).unwrap_or_else(|| text.trim().to_string());
        return Err(BitstampError::api_error(status, message));
    }

    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("status").and_then(|s| s.as_str()) == Some("error") {
        let message = error_reason(text).unwrap_or_else(|| "unknown error".to_string());
        return Err(BitstampError::api_error(status, message));
    }

    Ok(serde_json::from_value(value)?)
}

/// Extract `reason` from a Bitstamp error payload; it may be a string or a field map
fn error_reason(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let reason = value.get("reason").or_else(|| value.get("message"))?;
    match reason {
        serde_json::Value::String(reason) => Some(reason.clone()),
        other => Some(other.to_string()),
    }
}
