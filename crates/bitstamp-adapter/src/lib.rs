/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Bitstamp adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::Credentials;

// Re-export commonly used types from http
pub use http::{
    BitstampClient,
    BitstampError,
    ClientConfig,
    HttpVerb,
    RequestSigner,
    Result,
};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    BitstampWebSocket,
    CloseInfo,
    ConnectionState,
    InboundMessage,
    MessageHandler,
    ReconnectPolicy,
    WsConfig,
    WsHandle,
};
