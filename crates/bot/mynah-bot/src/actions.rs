//! Actions a trigger can fire
//!
//! Each action is one self-contained response to a message: post text,
//! react, queue a sound, or steer the process lifecycle. Actions carry
//! their own parameters and execute against the shared [`BotContext`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mynah_core::{ChannelId, MynahError, Result};
use mynah_voicebox::Payload;

use crate::context::{BotContext, EventContext};
use crate::lifecycle::LifecycleEvent;

/// One thing the bot does in response to a trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Post a text reply
    Write {
        /// Message body
        text: String,
        /// Target channel; defaults to where the trigger came from
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<ChannelId>,
    },
    /// React to the triggering message with an emoji
    React {
        /// Emoji to attach
        emoji: String,
    },
    /// Queue a sound into a voice channel
    Speak {
        /// Sound name resolved through the soundbank
        sound: String,
        /// Explicit target channel; defaults to wherever the author sits
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<ChannelId>,
    },
    /// Replace the guild's voice session with a fresh one
    Reconnect {
        /// Channel the new session parks in while idle
        #[serde(default, skip_serializing_if = "Option::is_none")]
        idle_channel: Option<ChannelId>,
    },
    /// Ask the host process to restart the bot
    Restart,
    /// Ask the host process to shut the bot down
    Quit,
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Write { .. } => "write",
            Action::React { .. } => "react",
            Action::Speak { .. } => "speak",
            Action::Reconnect { .. } => "reconnect",
            Action::Restart => "restart",
            Action::Quit => "quit",
        }
    }

    /// Run the action against the bot's shared state
    pub async fn execute(&self, bot: &BotContext, origin: &EventContext) -> Result<()> {
        match self {
            Action::Write { text, channel_id } => {
                let target = channel_id.unwrap_or(origin.channel_id);
                bot.gateway.send_message(target, text).await?;
                debug!(channel_id = %target, "Wrote reply");
                Ok(())
            }
            Action::React { emoji } => {
                bot.gateway
                    .add_reaction(origin.channel_id, origin.message_id, emoji)
                    .await
            }
            Action::Speak { sound, channel_id } => {
                let guild_id = origin
                    .guild_id
                    .ok_or_else(|| MynahError::action("speak requires a guild message"))?;
                let target = match channel_id {
                    Some(channel_id) => *channel_id,
                    None => bot
                        .occupancy
                        .channel_of(guild_id, origin.author)
                        .await
                        .ok_or_else(|| {
                            MynahError::action(format!(
                                "user {} is not in a voice channel",
                                origin.author
                            ))
                        })?,
                };
                let frames = bot.soundbank.frames(sound).await?;
                let payload = Payload::named(sound.clone(), target, frames.as_ref().clone());
                bot.voiceboxes.enqueue_payload(guild_id, payload).await?;
                info!(
                    guild_id = %guild_id,
                    channel_id = %target,
                    sound = %sound,
                    "Queued sound"
                );
                Ok(())
            }
            Action::Reconnect { idle_channel } => {
                let guild_id = origin
                    .guild_id
                    .ok_or_else(|| MynahError::action("reconnect requires a guild message"))?;
                bot.voiceboxes
                    .open(guild_id, *idle_channel, bot.voice_defaults.clone())
                    .await;
                Ok(())
            }
            Action::Restart => {
                bot.lifecycle.request(LifecycleEvent::Restart);
                Ok(())
            }
            Action::Quit => {
                // Voice sessions come down before anyone reacts to the event,
                // so subscribers observe a quiet bot.
                bot.voiceboxes.shutdown().await;
                bot.lifecycle.request(LifecycleEvent::Shutdown);
                Ok(())
            }
        }
    }
}
