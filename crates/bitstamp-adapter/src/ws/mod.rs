/*
[INPUT]:  WebSocket configuration, subscription channels and a message handler
[OUTPUT]: Raw live-feed frames and connection lifecycle state
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new control events or changing connection logic
*/

pub mod client;
pub mod message;
pub mod reconnect;

pub use client::{
    BitstampWebSocket, CloseInfo, ConnectionState, DEFAULT_WS_URL, MessageHandler, WsConfig,
    WsHandle, subscription_frames,
};
pub use message::{ChannelData, ControlMessage, InboundMessage};
pub use reconnect::ReconnectPolicy;
