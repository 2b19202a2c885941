/*
[INPUT]:  HTTP client configuration, credentials and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod private;
pub mod public;
pub mod signature;

pub use error::{BitstampError, Result};
pub use signature::{AuthHeaders, RequestSigner, SignatureInput};

pub use client::{BitstampClient, ClientConfig, DEFAULT_BASE_URL, HttpVerb};
