//! The chat side of the bot, seen from the core.

use std::future::Future;

use pugbot_transport::TransportError;

/// Delivers bot output to the chat network.
///
/// The chat client (connection handshake, keepalive, channel joins) lives
/// outside this crate and implements this trait.
pub trait Notifier: Send + Sync + 'static {
    /// Posts `text` to a channel.
    fn notify(
        &self,
        channel: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends `text` privately to one user.
    fn whisper(
        &self,
        nick: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A [`Notifier`] that writes every message to the log. Useful when no
/// chat network is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    async fn notify(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        tracing::info!(channel, text, "notify");
        Ok(())
    }

    async fn whisper(&self, nick: &str, text: &str) -> Result<(), TransportError> {
        tracing::info!(nick, text, "whisper");
        Ok(())
    }
}
