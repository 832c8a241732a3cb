//! Session registry: guild → voicebox
//!
//! The one place sessions are created, looked up, and torn down. All map
//! mutation happens under the `RwLock`; see the individual methods for how
//! long each path holds it.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info};

use mynah_core::{ChannelId, GuildId, MynahError, Result};

use crate::config::VoiceboxConfig;
use crate::connection::ConnectionProvider;
use crate::payload::Payload;
use crate::session::Voicebox;

/// Maps guilds to their live voice session
///
/// Lock discipline: `open`, `close`, and `shutdown` hold the write lock
/// across the outgoing consumer's teardown, so no interleaving of those
/// calls can leave two consumers (or two connections) live for one guild.
/// Everything else takes a brief read lock, clones the `Arc`, and releases
/// before doing any work.
pub struct VoiceboxRegistry {
    provider: Arc<dyn ConnectionProvider>,
    sessions: RwLock<HashMap<GuildId, Arc<Voicebox>>>,
}

impl VoiceboxRegistry {
    /// Create an empty registry over a connection provider
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session for a guild, replacing any existing one
    ///
    /// An existing session is fully closed first: its consumer has exited
    /// and released its connection before the new consumer is spawned, so no
    /// two consumers for one guild ever hold connections concurrently.
    pub async fn open(
        &self,
        guild_id: GuildId,
        idle_channel: Option<ChannelId>,
        config: VoiceboxConfig,
    ) -> Arc<Voicebox> {
        let mut sessions = self.sessions.write().await;
        if let Some(old) = sessions.remove(&guild_id) {
            debug!(guild_id = %guild_id, "Replacing existing voice session");
            old.close().await;
        }
        let session = Arc::new(Voicebox::spawn(
            guild_id,
            idle_channel,
            self.provider.clone(),
            config,
        ));
        sessions.insert(guild_id, session.clone());
        info!(guild_id = %guild_id, "Voice session opened");
        session
    }

    /// Close a guild's session and wait for it to fully terminate
    ///
    /// The registry lock stays held until the consumer task has exited and
    /// released its connection, so an `open` racing this close waits instead
    /// of spawning a second consumer while the old connection is still
    /// coming down. A no-op when the guild has no session: closing twice, or
    /// closing a guild that was never opened, is not an error.
    pub async fn close(&self, guild_id: GuildId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(&guild_id) {
            session.close().await;
            info!(guild_id = %guild_id, "Voice session closed");
        }
    }

    /// Look up a guild's session
    pub async fn get(&self, guild_id: GuildId) -> Option<Arc<Voicebox>> {
        self.sessions.read().await.get(&guild_id).cloned()
    }

    /// Queue frames for a guild; fails fast with `NoSession` or `QueueFull`
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        frames: Vec<Bytes>,
    ) -> Result<()> {
        self.enqueue_payload(guild_id, Payload::new(channel_id, frames))
            .await
    }

    /// Queue an already-built payload for a guild
    pub async fn enqueue_payload(&self, guild_id: GuildId, payload: Payload) -> Result<()> {
        let session = self
            .get(guild_id)
            .await
            .ok_or_else(|| MynahError::no_session(guild_id))?;
        session.enqueue(payload)
    }

    /// Skip the currently-playing payload in a guild
    pub async fn skip(&self, guild_id: GuildId) -> Result<()> {
        let session = self
            .get(guild_id)
            .await
            .ok_or_else(|| MynahError::no_session(guild_id))?;
        session.skip()
    }

    /// Toggle pause in a guild; returns the new paused state
    pub async fn pause(&self, guild_id: GuildId) -> Result<bool> {
        let session = self
            .get(guild_id)
            .await
            .ok_or_else(|| MynahError::no_session(guild_id))?;
        session.pause()
    }

    /// Stop playback and drain the queue in a guild
    pub async fn stop(&self, guild_id: GuildId) -> Result<()> {
        let session = self
            .get(guild_id)
            .await
            .ok_or_else(|| MynahError::no_session(guild_id))?;
        session.stop()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True when no session is open
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Close every session, waiting for each to terminate
    ///
    /// Like [`close`](Self::close), the registry lock stays held for the
    /// whole drain: an `open` arriving mid-shutdown waits until every old
    /// consumer has exited rather than overlapping one.
    pub async fn shutdown(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        for (_, session) in sessions.drain() {
            session.close().await;
        }
        if count > 0 {
            info!(sessions = count, "All voice sessions closed");
        }
    }
}
