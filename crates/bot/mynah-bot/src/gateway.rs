//! Outbound chat surface
//!
//! Actions talk to chat through this trait rather than a concrete client,
//! so the dispatch pipeline runs unchanged against a live gateway or a
//! recording test double.

use async_trait::async_trait;

use mynah_core::{ChannelId, MessageId, Result};

/// Outbound operations a chat backend must provide
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post a message to a text channel
    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()>;

    /// Attach an emoji reaction to an existing message
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<()>;
}
