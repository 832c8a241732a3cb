//! Voice-channel presence tracking
//!
//! Folds the gateway's voice state updates into a per-guild map so that
//! actions can find which channel a user is speaking from without asking
//! the chat backend.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use mynah_core::{ChannelId, GuildId, UserId, VoiceStateEvent};

/// Which users sit in which voice channels, per guild
#[derive(Default)]
pub struct Occupancy {
    guilds: RwLock<HashMap<GuildId, HashMap<UserId, ChannelId>>>,
}

impl Occupancy {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one voice state update into the tracker
    ///
    /// An event with no channel means the user left voice entirely.
    pub async fn apply(&self, event: &VoiceStateEvent) {
        let mut guilds = self.guilds.write().await;
        match event.channel_id {
            Some(channel_id) => {
                guilds
                    .entry(event.guild_id)
                    .or_default()
                    .insert(event.user_id, channel_id);
                debug!(
                    guild_id = %event.guild_id,
                    user_id = %event.user_id,
                    channel_id = %channel_id,
                    "User entered voice channel"
                );
            }
            None => {
                if let Some(users) = guilds.get_mut(&event.guild_id) {
                    users.remove(&event.user_id);
                    if users.is_empty() {
                        guilds.remove(&event.guild_id);
                    }
                }
                debug!(
                    guild_id = %event.guild_id,
                    user_id = %event.user_id,
                    "User left voice"
                );
            }
        }
    }

    /// The voice channel a user currently occupies, if any
    pub async fn channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        self.guilds
            .read()
            .await
            .get(&guild_id)
            .and_then(|users| users.get(&user_id))
            .copied()
    }

    /// Number of tracked users across a guild's voice channels
    pub async fn guild_population(&self, guild_id: GuildId) -> usize {
        self.guilds
            .read()
            .await
            .get(&guild_id)
            .map(|users| users.len())
            .unwrap_or(0)
    }
}
