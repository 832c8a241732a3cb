//! Shared type definitions

pub mod events;
pub mod ids;

pub use events::{ChatEvent, MessageEvent, VoiceStateEvent};
pub use ids::{ChannelId, GuildId, MessageId, UserId};
