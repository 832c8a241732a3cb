//! Session configuration and capability flags

use std::time::Duration;

use mynah_core::config::{get_env_bool, get_env_int};

/// Control signals a session honors beyond `quit`
///
/// All flags default to off; a session only reacts to `skip`, `pause` or
/// `stop` when it was opened with the matching capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Allow abandoning the currently-playing payload
    pub skippable: bool,
    /// Allow holding frame delivery between frames
    pub pausable: bool,
    /// Allow abandoning the current payload and draining the queue
    pub stoppable: bool,
}

impl Capabilities {
    /// Enable every capability
    pub fn all() -> Self {
        Self {
            skippable: true,
            pausable: true,
            stoppable: true,
        }
    }
}

/// Per-session configuration, supplied at `open` and immutable afterwards
#[derive(Debug, Clone)]
pub struct VoiceboxConfig {
    /// Maximum number of queued payloads before enqueue fails fast
    pub queue_length: usize,
    /// Bounded wait for the connection to accept one frame
    pub send_timeout: Duration,
    /// Idle period after a payload before re-joining the idle channel
    pub idle_timeout: Duration,
    /// Which control signals this session honors
    pub capabilities: Capabilities,
}

impl Default for VoiceboxConfig {
    fn default() -> Self {
        Self {
            queue_length: 100,
            send_timeout: Duration::from_millis(1000),
            idle_timeout: Duration::from_secs(300),
            capabilities: Capabilities::default(),
        }
    }
}

impl VoiceboxConfig {
    /// Build a configuration from environment variables
    ///
    /// Recognized variables, all optional:
    /// `MYNAH_VOICE_QUEUE_LENGTH`, `MYNAH_VOICE_SEND_TIMEOUT_MS`,
    /// `MYNAH_VOICE_IDLE_TIMEOUT_SECS`, `MYNAH_VOICE_SKIPPABLE`,
    /// `MYNAH_VOICE_PAUSABLE`, `MYNAH_VOICE_STOPPABLE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let queue_length: usize =
            get_env_int("MYNAH_VOICE_QUEUE_LENGTH", defaults.queue_length);
        let send_timeout_ms: u64 = get_env_int(
            "MYNAH_VOICE_SEND_TIMEOUT_MS",
            defaults.send_timeout.as_millis() as u64,
        );
        let idle_timeout_secs: u64 = get_env_int(
            "MYNAH_VOICE_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout.as_secs(),
        );

        Self {
            // A zero-length queue could never accept a payload
            queue_length: queue_length.max(1),
            send_timeout: Duration::from_millis(send_timeout_ms),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            capabilities: Capabilities {
                skippable: get_env_bool("MYNAH_VOICE_SKIPPABLE", false),
                pausable: get_env_bool("MYNAH_VOICE_PAUSABLE", false),
                stoppable: get_env_bool("MYNAH_VOICE_STOPPABLE", false),
            },
        }
    }
}
