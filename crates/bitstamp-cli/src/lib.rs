/*
[INPUT]:  Crate modules
[OUTPUT]: Public surface of the bitstamp CLI (config + commands)
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod commands;
pub mod config;

pub use commands::Command;
pub use config::BitstampConfig;
