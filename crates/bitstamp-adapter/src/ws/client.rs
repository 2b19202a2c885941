/*
[INPUT]:  WebSocket URL, channel list and a message handler
[OUTPUT]: Raw inbound frames delivered to the handler; lifecycle state updates
[POS]:    WebSocket layer - real-time data stream handling
[UPDATE]: When changing subscription protocol, lifecycle states or stop semantics
*/

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::{BitstampError, Result};
use crate::ws::message::ControlMessage;

pub const DEFAULT_WS_URL: &str = "wss://ws.bitstamp.net/";
const RAW_LOG_MAX_BYTES: usize = 256;

#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
        }
    }
}

/// Connection lifecycle.
///
/// `Disconnected -> Connecting -> Open -> Streaming -> Closed`, with `Error`
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Socket is up; configured subscriptions are being sent
    Open,
    Streaming,
    Closed,
    Error,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Error)
    }

    pub fn accepts_control_frames(self) -> bool {
        matches!(self, ConnectionState::Open | ConnectionState::Streaming)
    }
}

/// Close status as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// Receives everything the connection surfaces.
///
/// Called on the connection task; a handler that blocks stalls frame delivery.
pub trait MessageHandler: Send {
    fn on_message(&mut self, message: &str);

    fn on_error(&mut self, error: &BitstampError) {
        warn!(error = %error, "ws error");
    }

    fn on_close(&mut self, close: Option<&CloseInfo>) {
        match close {
            Some(info) => info!(code = info.code, reason = %info.reason, "ws connection closed"),
            None => info!("ws connection closed"),
        }
    }
}

impl<F> MessageHandler for F
where
    F: FnMut(&str) + Send,
{
    fn on_message(&mut self, message: &str) {
        self(message)
    }
}

/// Cloneable control surface for a running [`BitstampWebSocket`]
#[derive(Debug, Clone)]
pub struct WsHandle {
    outbound_tx: mpsc::UnboundedSender<String>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown: CancellationToken,
}

impl WsHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Wait until the connection is streaming or has terminated
    pub async fn wait_until_streaming(&self) -> ConnectionState {
        let mut state_rx = self.state_rx.clone();
        match state_rx
            .wait_for(|state| *state == ConnectionState::Streaming || state.is_terminal())
            .await
        {
            Ok(state) => *state,
            Err(_) => ConnectionState::Closed,
        }
    }

    /// Send `bts:subscribe` for a channel
    pub fn subscribe(&self, channel: &str) -> Result<()> {
        self.send_control(ControlMessage::subscribe(channel))
    }

    /// Send `bts:unsubscribe` for a channel
    pub fn unsubscribe(&self, channel: &str) -> Result<()> {
        self.send_control(ControlMessage::unsubscribe(channel))
    }

    /// Close the socket and make `run` return; terminal for this client
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once `stop()` has been called on any handle
    pub async fn stopped(&self) {
        self.shutdown.cancelled().await;
    }

    fn send_control(&self, message: ControlMessage) -> Result<()> {
        let state = self.state();
        if !state.accepts_control_frames() {
            return Err(BitstampError::WebSocket(format!(
                "WebSocket not connected (state {state:?})"
            )));
        }

        let frame = message.to_json()?;
        self.outbound_tx
            .send(frame)
            .map_err(|_| BitstampError::WebSocket("WebSocket send channel closed".to_string()))?;

        info!(action = %message.event, channel = %message.data.channel, "ws control frame queued");
        Ok(())
    }
}

/// WebSocket client for the Bitstamp live feed
pub struct BitstampWebSocket<H> {
    config: WsConfig,
    channels: Vec<String>,
    handler: H,
    outbound_tx: mpsc::UnboundedSender<String>,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    last_session_streamed: bool,
}

impl<H: MessageHandler> BitstampWebSocket<H> {
    /// Create a client for the public endpoint
    pub fn new(channels: Vec<String>, handler: H) -> Self {
        Self::with_config(WsConfig::default(), channels, handler)
    }

    pub fn with_config(config: WsConfig, channels: Vec<String>, handler: H) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            channels,
            handler,
            outbound_tx,
            outbound_rx,
            state_tx,
            shutdown: CancellationToken::new(),
            last_session_streamed: false,
        }
    }

    pub fn handle(&self) -> WsHandle {
        WsHandle {
            outbound_tx: self.outbound_tx.clone(),
            state_rx: self.state_tx.subscribe(),
            shutdown: self.shutdown.clone(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub(crate) fn last_session_streamed(&self) -> bool {
        self.last_session_streamed
    }

    /// Run one connection until it closes, fails or is stopped.
    ///
    /// Errors and close events go to the handler; the returned state is
    /// either [`ConnectionState::Closed`] or [`ConnectionState::Error`].
    pub async fn run(&mut self) -> ConnectionState {
        self.last_session_streamed = false;
        if self.shutdown.is_cancelled() {
            return self.set_state(ConnectionState::Closed);
        }

        // Frames queued for a previous session are stale.
        while self.outbound_rx.try_recv().is_ok() {}

        self.set_state(ConnectionState::Connecting);
        info!(url = %self.config.url, "connecting to Bitstamp WebSocket");

        let connected = tokio::select! {
            _ = self.shutdown.cancelled() => {
                return self.set_state(ConnectionState::Closed);
            }
            result = connect_async(self.config.url.as_str()) => result,
        };
        let (ws_stream, _response) = match connected {
            Ok(pair) => pair,
            Err(err) => {
                return self.fail(BitstampError::WebSocket(format!("connect failed: {err}")));
            }
        };

        self.set_state(ConnectionState::Open);
        let (mut write, mut read) = ws_stream.split();

        for frame in subscription_frames(&self.channels) {
            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => return self.fail(err),
            };
            if let Err(err) = write.send(WsMessage::Text(frame.into())).await {
                return self.fail(BitstampError::WebSocket(format!("subscribe failed: {err}")));
            }
        }
        info!(channels = ?self.channels, "ws subscriptions sent");

        self.set_state(ConnectionState::Streaming);
        self.last_session_streamed = true;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("ws stop requested");
                    let _ = write.send(WsMessage::Close(None)).await;
                    let _ = write.close().await;
                    self.handler.on_close(None);
                    return self.set_state(ConnectionState::Closed);
                }
                // The client owns a sender, so the channel never yields `None`.
                Some(frame) = self.outbound_rx.recv() => {
                    if let Err(err) = write.send(WsMessage::Text(frame.into())).await {
                        return self.fail(BitstampError::WebSocket(format!("send failed: {err}")));
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(WsMessage::Text(text))) => {
                            self.handler.on_message(text.as_str());
                        }
                        Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => self.handler.on_message(text),
                            Err(_) => debug!(bytes = bytes.len(), "ws dropped non-utf8 binary frame"),
                        },
                        Some(Ok(WsMessage::Close(frame))) => {
                            let close = frame.map(|frame| CloseInfo {
                                code: u16::from(frame.code),
                                reason: frame.reason.as_str().to_string(),
                            });
                            if let Some(info) = &close {
                                debug!(
                                    code = info.code,
                                    reason = %truncate_for_log(&info.reason, RAW_LOG_MAX_BYTES),
                                    "ws close frame received"
                                );
                            }
                            let _ = write.close().await;
                            self.handler.on_close(close.as_ref());
                            return self.set_state(ConnectionState::Closed);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            return self.fail(BitstampError::WebSocket(format!("read failed: {err}")));
                        }
                        None => {
                            self.handler.on_close(None);
                            return self.set_state(ConnectionState::Closed);
                        }
                    }
                }
            }
        }
    }

    fn set_state(&self, state: ConnectionState) -> ConnectionState {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!(from = ?previous, to = ?state, "ws state transition");
        }
        state
    }

    fn fail(&mut self, error: BitstampError) -> ConnectionState {
        self.handler.on_error(&error);
        self.set_state(ConnectionState::Error)
    }
}

/// One `bts:subscribe` frame per channel, in configuration order
pub fn subscription_frames(channels: &[String]) -> Vec<Result<String>> {
    channels
        .iter()
        .map(|channel| ControlMessage::subscribe(channel.as_str()).to_json())
        .collect()
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}
