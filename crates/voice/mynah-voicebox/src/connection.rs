//! Connection provider seam
//!
//! The dispatcher never talks to a real voice stack directly; embedders
//! implement these two traits over their platform client (or use
//! [`crate::testing::MockVoiceBackend`] in tests).

use async_trait::async_trait;
use bytes::Bytes;

use mynah_core::{ChannelId, GuildId, Result};

/// A live "speak into channel X" handle
///
/// Exclusively owned by one session's consumer task; never shared.
#[async_trait]
pub trait VoiceConnection: Send {
    /// Hand one frame to the transport
    ///
    /// Expected to accept promptly or fail; the caller bounds the wait with
    /// its configured send timeout, so an implementation that blocks forever
    /// costs the session at most one timeout per payload.
    async fn send_frame(&mut self, frame: Bytes) -> Result<()>;

    /// Tear the connection down
    ///
    /// Must be idempotent and prompt. Called at most once per handle by the
    /// dispatcher, but implementations should tolerate repeats.
    async fn disconnect(&mut self);
}

/// Yields voice connections for (guild, channel) targets
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Join a voice channel and return the live handle
    ///
    /// Calling `join` again for the same guild with a different channel is a
    /// rejoin: the provider performs the implicit leave itself, so the guild
    /// never holds two transport connections. On failure the guild is left
    /// disconnected.
    async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Box<dyn VoiceConnection>>;
}
