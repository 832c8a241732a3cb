//! Error types for the mynah framework

use thiserror::Error;

use crate::types::{ChannelId, GuildId};

/// Main error type for mynah operations
#[derive(Debug, Error)]
pub enum MynahError {
    /// Payload rejected because the session's queue is at capacity
    #[error("Voice queue full for guild {guild_id}; payload dropped")]
    QueueFull {
        /// Guild whose queue rejected the payload
        guild_id: GuildId,
    },

    /// No voice session is open for the targeted guild
    #[error("No voice session for guild {guild_id}")]
    NoSession {
        /// Guild with no live session
        guild_id: GuildId,
    },

    /// The connection provider could not join a voice channel
    #[error("Failed to join channel {channel_id} in guild {guild_id}: {reason}")]
    JoinFailed {
        /// Guild the join targeted
        guild_id: GuildId,
        /// Channel the join targeted
        channel_id: ChannelId,
        /// Provider-reported reason
        reason: String,
    },

    /// A frame was not accepted by the connection within the send timeout
    #[error("Frame send to channel {channel_id} in guild {guild_id} timed out")]
    SendTimeout {
        /// Guild the frame targeted
        guild_id: GuildId,
        /// Channel the frame targeted
        channel_id: ChannelId,
    },

    /// A control signal targeted a capability the session was opened without
    #[error("Voice session for guild {guild_id} is not {capability}")]
    CapabilityDisabled {
        /// Guild whose session rejected the signal
        guild_id: GuildId,
        /// Name of the missing capability flag
        capability: &'static str,
    },

    /// Malformed soundbite container data
    #[error("Soundbite error: {0}")]
    Soundbite(String),

    /// Requested sound does not exist in the soundbank
    #[error("Unknown sound: {0}")]
    UnknownSound(String),

    /// Chat gateway error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Trigger store error
    #[error("Store error: {0}")]
    Store(String),

    /// Action execution error
    #[error("Action error: {0}")]
    Action(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using MynahError
pub type Result<T> = std::result::Result<T, MynahError>;

impl MynahError {
    /// Create a queue-full error
    pub fn queue_full(guild_id: GuildId) -> Self {
        MynahError::QueueFull { guild_id }
    }

    /// Create a no-session error
    pub fn no_session(guild_id: GuildId) -> Self {
        MynahError::NoSession { guild_id }
    }

    /// Create a join-failed error
    pub fn join_failed(
        guild_id: GuildId,
        channel_id: ChannelId,
        reason: impl Into<String>,
    ) -> Self {
        MynahError::JoinFailed {
            guild_id,
            channel_id,
            reason: reason.into(),
        }
    }

    /// Create a send-timeout error
    pub fn send_timeout(guild_id: GuildId, channel_id: ChannelId) -> Self {
        MynahError::SendTimeout {
            guild_id,
            channel_id,
        }
    }

    /// Create a capability-disabled error
    pub fn capability_disabled(guild_id: GuildId, capability: &'static str) -> Self {
        MynahError::CapabilityDisabled {
            guild_id,
            capability,
        }
    }

    /// Create a soundbite error
    pub fn soundbite(msg: impl Into<String>) -> Self {
        MynahError::Soundbite(msg.into())
    }

    /// Create an unknown-sound error
    pub fn unknown_sound(msg: impl Into<String>) -> Self {
        MynahError::UnknownSound(msg.into())
    }

    /// Create a gateway error
    pub fn gateway(msg: impl Into<String>) -> Self {
        MynahError::Gateway(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        MynahError::Store(msg.into())
    }

    /// Create an action error
    pub fn action(msg: impl Into<String>) -> Self {
        MynahError::Action(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        MynahError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        MynahError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MynahError::queue_full(GuildId(7));
        assert_eq!(
            err.to_string(),
            "Voice queue full for guild 7; payload dropped"
        );

        let err = MynahError::no_session(GuildId(7));
        assert_eq!(err.to_string(), "No voice session for guild 7");

        let err = MynahError::join_failed(GuildId(1), ChannelId(2), "channel is full");
        assert_eq!(
            err.to_string(),
            "Failed to join channel 2 in guild 1: channel is full"
        );

        let err = MynahError::capability_disabled(GuildId(3), "skippable");
        assert_eq!(err.to_string(), "Voice session for guild 3 is not skippable");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
