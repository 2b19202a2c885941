/*
[INPUT]:  Client id, API key and API secret (constructor args or BITSTAMP_* env vars)
[OUTPUT]: Immutable credential set used by the request signer
[POS]:    Auth layer - credential storage and validation
[UPDATE]: When credential sources or validation rules change
*/

use std::fmt;

use crate::http::{BitstampError, Result};

pub const CLIENT_ID_ENV: &str = "BITSTAMP_CLIENT_ID";
pub const API_KEY_ENV: &str = "BITSTAMP_API_KEY";
pub const API_SECRET_ENV: &str = "BITSTAMP_API_SECRET";

/// Bitstamp API credentials for authorized requests.
///
/// All three parts are required; construction fails if any is missing or empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    api_key: String,
    api_secret: Box<[u8]>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials, rejecting empty parts
    pub fn new(
        client_id: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        Self::from_parts(
            Some(client_id.into()),
            Some(api_key.into()),
            Some(api_secret.into()),
        )
    }

    /// Create credentials from optional parts.
    ///
    /// Fails with [`BitstampError::Config`] naming every missing part.
    pub fn from_parts(
        client_id: Option<String>,
        api_key: Option<String>,
        api_secret: Option<Vec<u8>>,
    ) -> Result<Self> {
        let client_id = client_id.filter(|value| !value.is_empty());
        let api_key = api_key.filter(|value| !value.is_empty());
        let api_secret = api_secret.filter(|value| !value.is_empty());

        match (client_id, api_key, api_secret) {
            (Some(client_id), Some(api_key), Some(api_secret)) => Ok(Self {
                client_id,
                api_key,
                api_secret: api_secret.into_boxed_slice(),
            }),
            (client_id, api_key, api_secret) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push("client_id");
                }
                if api_key.is_none() {
                    missing.push("api_key");
                }
                if api_secret.is_none() {
                    missing.push("api_secret");
                }
                Err(BitstampError::Config(format!(
                    "api_key, api_secret and client_id must all be provided to authenticate (missing: {})",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Load credentials from `BITSTAMP_CLIENT_ID`, `BITSTAMP_API_KEY` and `BITSTAMP_API_SECRET`
    pub fn from_env() -> Result<Self> {
        Self::from_parts(
            std::env::var(CLIENT_ID_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_SECRET_ENV).ok().map(String::into_bytes),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &[u8] {
        &self.api_secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_keeps_all_parts() {
        let credentials = Credentials::new("123", "key", "secret").expect("credentials");
        assert_eq!(credentials.client_id(), "123");
        assert_eq!(credentials.api_key(), "key");
        assert_eq!(credentials.api_secret(), b"secret");
    }

    #[rstest]
    #[case(None, Some("key"), Some("secret"), "client_id")]
    #[case(Some("123"), None, Some("secret"), "api_key")]
    #[case(Some("123"), Some("key"), None, "api_secret")]
    #[case(Some(""), Some("key"), Some("secret"), "client_id")]
    fn test_missing_part_is_config_error(
        #[case] client_id: Option<&str>,
        #[case] api_key: Option<&str>,
        #[case] api_secret: Option<&str>,
        #[case] missing: &str,
    ) {
        let err = Credentials::from_parts(
            client_id.map(str::to_string),
            api_key.map(str::to_string),
            api_secret.map(|secret| secret.as_bytes().to_vec()),
        )
        .expect_err("credentials should be rejected");

        match err {
            BitstampError::Config(message) => assert!(message.contains(missing)),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("123", "key", "super-secret").expect("credentials");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("super-secret"));
    }
}
