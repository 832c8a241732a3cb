//! Gateway events the bot reacts to
//!
//! The gateway client itself lives outside this workspace; embedders translate
//! whatever their platform delivers into these two event shapes and feed them
//! to the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, GuildId, MessageId, UserId};

/// A text message observed by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Guild the message was sent in; None for direct messages
    pub guild_id: Option<GuildId>,
    /// Channel the message was sent in
    pub channel_id: ChannelId,
    /// Message id, used when reacting to the message
    pub message_id: MessageId,
    /// Author of the message
    pub author: UserId,
    /// Raw text content
    pub text: String,
    /// When the gateway delivered the event
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    /// Create a message event stamped with the current time
    pub fn new(
        guild_id: Option<GuildId>,
        channel_id: ChannelId,
        message_id: MessageId,
        author: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            guild_id,
            channel_id,
            message_id,
            author,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A voice-state update: a user joined, moved between, or left voice channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStateEvent {
    /// Guild the update happened in
    pub guild_id: GuildId,
    /// User whose voice state changed
    pub user_id: UserId,
    /// The user's new voice channel; None means they left voice entirely
    pub channel_id: Option<ChannelId>,
}

/// Any event the bot dispatches on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A text message arrived
    Message(MessageEvent),
    /// A user's voice channel changed
    VoiceState(VoiceStateEvent),
}
