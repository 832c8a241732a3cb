//! # Mynah Core
//!
//! Shared foundation for the mynah bot framework:
//!
//! - Identifier newtypes and gateway event shapes
//! - The framework-wide error taxonomy
//! - Environment configuration helpers
//! - Logging initialization
//!
//! The voice dispatch core lives in `mynah-voicebox`; trigger matching and
//! actions live in `mynah-bot`. Both build on the types defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export the types used at almost every call site
pub use config::{
    get_env_bool, get_env_int, get_env_or, get_required_env, load_env, load_env_from_path,
    validate_env,
};
pub use error::{MynahError, Result};
pub use logging::{init_logging, try_init_logging};
pub use types::{ChannelId, ChatEvent, GuildId, MessageEvent, MessageId, UserId, VoiceStateEvent};
