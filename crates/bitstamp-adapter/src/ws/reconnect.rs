/*
[INPUT]:  A configured BitstampWebSocket and a retry policy
[OUTPUT]: Repeated sessions with exponential backoff until stop or retry exhaustion
[POS]:    WebSocket layer - optional reconnect supervisor
[UPDATE]: When changing backoff parameters or reset semantics
*/

use std::time::Duration;

use tracing::{info, warn};

use crate::ws::client::{BitstampWebSocket, ConnectionState, MessageHandler};

/// Exponential backoff settings for [`BitstampWebSocket::run_with_reconnect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive failed sessions tolerated before giving up
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry `attempt` (1-based): `min(base * 2^(attempt-1), max)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

impl<H: MessageHandler> BitstampWebSocket<H> {
    /// Run sessions back to back, sleeping between them.
    ///
    /// The retry counter resets whenever a session reaches `Streaming`.
    /// Returns `Closed` after `stop()`, or the last session's state once
    /// `max_retries` consecutive sessions failed.
    pub async fn run_with_reconnect(&mut self, policy: &ReconnectPolicy) -> ConnectionState {
        let mut attempt: u32 = 0;
        let shutdown = self.handle();

        loop {
            let state = self.run().await;
            if self.is_stopped() {
                return ConnectionState::Closed;
            }

            if self.last_session_streamed() {
                attempt = 0;
            }
            attempt += 1;
            if attempt > policy.max_retries {
                warn!(attempts = attempt - 1, ?state, "ws reconnect attempts exhausted");
                return state;
            }

            let backoff = policy.backoff(attempt);
            warn!(attempt, ?backoff, ?state, "ws session ended; reconnecting with backoff");

            tokio::select! {
                _ = shutdown.stopped() => {
                    info!("ws stop requested during backoff");
                    return ConnectionState::Closed;
                }
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }
}
