/*
[INPUT]:  Authentication configuration and credentials
[OUTPUT]: Validated credentials for signed requests
[POS]:    Auth layer - handles Bitstamp API authentication material
[UPDATE]: When credential handling changes
*/

pub mod credentials;

pub use credentials::{API_KEY_ENV, API_SECRET_ENV, CLIENT_ID_ENV, Credentials};
