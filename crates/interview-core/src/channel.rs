use anyhow::Result;
use async_trait::async_trait;
use interview_types::{ClientEvent, ServerEvent};
#[cfg(test)]
use mockall::automock;

/// A bidirectional message channel to the interview backend.
///
/// The session only depends on the message contract; the transport behind it
/// is up to the implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionChannel: Send + Sync {
    /// Sends one event to the backend.
    async fn send(&self, event: ClientEvent) -> Result<()>;

    /// Returns the receiver of inbound events. The stream ends when the
    /// channel is disconnected.
    async fn server_events(&mut self) -> Result<tokio::sync::mpsc::Receiver<ServerEvent>>;

    /// Closes the channel.
    async fn close(&mut self) -> Result<()>;
}
