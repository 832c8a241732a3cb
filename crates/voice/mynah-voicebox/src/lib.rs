//! # Mynah Voicebox
//!
//! Per-guild voice payload dispatch:
//!
//! - A bounded payload queue per guild, drained by one consumer task
//! - Frame pacing against a pluggable connection provider
//! - Idle/afk channel recovery after playback
//! - `skip`/`pause`/`stop` control signals gated by capability flags
//! - Level-triggered `quit` with a hard bound on cancellation latency
//!
//! Producers go through [`VoiceboxRegistry`]: `open` a guild, `enqueue`
//! payloads, `close` when done. The consumer task owns the connection handle
//! exclusively; payload-scoped failures (join errors, send timeouts) never
//! kill a session — only `quit` does.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mynah_core::{ChannelId, GuildId};
//! use mynah_voicebox::{VoiceboxConfig, VoiceboxRegistry};
//!
//! # async fn example(provider: Arc<dyn mynah_voicebox::ConnectionProvider>) -> mynah_core::Result<()> {
//! let registry = VoiceboxRegistry::new(provider);
//! registry.open(GuildId(1), Some(ChannelId(100)), VoiceboxConfig::default()).await;
//! registry.enqueue(GuildId(1), ChannelId(200), vec![]).await?;
//! registry.close(GuildId(1)).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod frames;
pub mod payload;
pub mod registry;
pub mod session;
pub mod testing;

pub use config::{Capabilities, VoiceboxConfig};
pub use connection::{ConnectionProvider, VoiceConnection};
pub use payload::Payload;
pub use registry::VoiceboxRegistry;
pub use session::Voicebox;
