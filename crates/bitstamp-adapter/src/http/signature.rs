/*
[INPUT]:  Request parts (verb, domain, path, query, body) and API credentials
[OUTPUT]: Signed X-Auth* request headers
[POS]:    HTTP layer - request signing for authorized endpoints
[UPDATE]: When changing signing algorithm or header format
*/

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use ring::hmac;
use uuid::Uuid;

use crate::auth::Credentials;
use crate::http::{BitstampError, HttpVerb, Result};

pub const AUTH_VERSION: &str = "v2";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const X_AUTH: &str = "x-auth";
const X_AUTH_SIGNATURE: &str = "x-auth-signature";
const X_AUTH_NONCE: &str = "x-auth-nonce";
const X_AUTH_TIMESTAMP: &str = "x-auth-timestamp";
const X_AUTH_VERSION: &str = "x-auth-version";

/// Everything that goes into one request signature.
///
/// `query` is the canonical query including the leading `?`, or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureInput<'a> {
    pub method: HttpVerb,
    pub domain: &'a str,
    pub endpoint: &'a str,
    pub query: &'a str,
    pub content_type: Option<&'a str>,
    pub nonce: &'a str,
    pub timestamp: &'a str,
    pub body: &'a str,
}

/// Header set attached to an authorized request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub auth: String,
    pub signature: String,
    pub nonce: String,
    pub timestamp: String,
    pub version: &'static str,
    pub content_type: Option<String>,
}

impl AuthHeaders {
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, X_AUTH, &self.auth)?;
        insert_header(&mut headers, X_AUTH_SIGNATURE, &self.signature)?;
        insert_header(&mut headers, X_AUTH_NONCE, &self.nonce)?;
        insert_header(&mut headers, X_AUTH_TIMESTAMP, &self.timestamp)?;
        insert_header(&mut headers, X_AUTH_VERSION, self.version)?;
        if let Some(content_type) = &self.content_type {
            let value = HeaderValue::from_str(content_type)
                .map_err(|e| BitstampError::Config(format!("invalid content type: {e}")))?;
            headers.insert(CONTENT_TYPE, value);
        }
        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| BitstampError::Config(format!("invalid {name} header value: {e}")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Signs requests with HMAC-SHA256 using the API secret
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    /// Create a new request signer for the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Build a signer from the credentials a client may or may not hold.
    ///
    /// Authorized requests must never go out unsigned, so absence is an error.
    pub fn from_optional(credentials: Option<&Credentials>) -> Result<Self> {
        credentials.cloned().map(Self::new).ok_or_else(|| {
            BitstampError::Config(
                "api_key, api_secret and client_id all need to be provided in order to authenticate"
                    .to_string(),
            )
        })
    }

    /// Fresh single-use nonce (UUID v4 from the OS RNG)
    pub fn nonce() -> String {
        Uuid::new_v4().to_string()
    }

    /// Current Unix time in milliseconds
    pub fn timestamp_millis() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Build the string to sign.
    ///
    /// Format: `BITSTAMP {api_key}{method}{domain}{endpoint}{query}{content_type}{nonce}{timestamp}v2{body}`
    pub fn message(&self, input: &SignatureInput<'_>) -> String {
        format!(
            "BITSTAMP {api_key}{method}{domain}{endpoint}{query}{content_type}{nonce}{timestamp}{version}{body}",
            api_key = self.credentials.api_key(),
            method = input.method.as_str(),
            domain = input.domain,
            endpoint = input.endpoint,
            query = input.query,
            content_type = input.content_type.unwrap_or_default(),
            nonce = input.nonce,
            timestamp = input.timestamp,
            version = AUTH_VERSION,
            body = input.body,
        )
    }

    /// Sign a request and return the lowercase hex HMAC-SHA256 digest
    pub fn sign(&self, input: &SignatureInput<'_>) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, self.credentials.api_secret());
        let tag = hmac::sign(&key, self.message(input).as_bytes());
        hex::encode(tag.as_ref())
    }

    /// Header set for a fully specified input
    pub fn headers_for(&self, input: &SignatureInput<'_>) -> AuthHeaders {
        AuthHeaders {
            auth: format!("BITSTAMP {}", self.credentials.api_key()),
            signature: self.sign(input),
            nonce: input.nonce.to_string(),
            timestamp: input.timestamp.to_string(),
            version: AUTH_VERSION,
            content_type: input.content_type.map(str::to_string),
        }
    }

    /// Sign with a freshly generated nonce and timestamp
    pub fn auth_headers(
        &self,
        method: HttpVerb,
        domain: &str,
        endpoint: &str,
        query: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> AuthHeaders {
        let nonce = Self::nonce();
        let timestamp = Self::timestamp_millis();
        self.headers_for(&SignatureInput {
            method,
            domain,
            endpoint,
            query,
            content_type,
            nonce: &nonce,
            timestamp: &timestamp,
            body,
        })
    }
}

/// Canonical query string for signing: `?k1=v1&k2=v2` in iteration order, or empty
pub fn canonical_query(params: &[(&str, String)]) -> Result<String> {
    if params.is_empty() {
        return Ok(String::new());
    }
    let encoded = serde_urlencoded::to_string(params)
        .map_err(|e| BitstampError::validation(format!("query parameters: {e}")))?;
    Ok(format!("?{encoded}"))
}

/// Form-encoded request body, or empty
pub fn form_body(params: &[(&str, String)]) -> Result<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| BitstampError::validation(format!("body parameters: {e}")))
}
