//! Shared state actions execute against

use std::sync::Arc;

use mynah_core::{ChannelId, GuildId, MessageEvent, MessageId, UserId};
use mynah_voicebox::{VoiceboxConfig, VoiceboxRegistry};

use crate::gateway::ChatGateway;
use crate::lifecycle::Lifecycle;
use crate::occupancy::Occupancy;
use crate::soundbank::Soundbank;

/// Long-lived bot state shared by every action execution
#[derive(Clone)]
pub struct BotContext {
    /// Outbound chat surface
    pub gateway: Arc<dyn ChatGateway>,
    /// Per-guild voice sessions
    pub voiceboxes: Arc<VoiceboxRegistry>,
    /// Named sound frames
    pub soundbank: Arc<Soundbank>,
    /// Who sits in which voice channel
    pub occupancy: Arc<Occupancy>,
    /// Restart and shutdown fan-out
    pub lifecycle: Lifecycle,
    /// Session settings used when an action opens a voice session
    pub voice_defaults: VoiceboxConfig,
}

/// Where the triggering message came from
#[derive(Debug, Clone, Copy)]
pub struct EventContext {
    /// Guild the message was posted in; absent for direct messages
    pub guild_id: Option<GuildId>,
    /// Text channel of the message
    pub channel_id: ChannelId,
    /// The message itself
    pub message_id: MessageId,
    /// Who wrote it
    pub author: UserId,
}

impl EventContext {
    /// Origin details of a message event
    pub fn from_message(event: &MessageEvent) -> Self {
        Self {
            guild_id: event.guild_id,
            channel_id: event.channel_id,
            message_id: event.message_id,
            author: event.author,
        }
    }
}
