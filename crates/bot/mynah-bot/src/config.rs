//! Bot configuration

use mynah_core::get_env_or;
use mynah_voicebox::VoiceboxConfig;

/// Top-level bot settings
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Directory holding `.snd` sound files
    pub sound_dir: String,
    /// Path to a JSON trigger table, when one is used
    pub trigger_file: Option<String>,
    /// Settings applied when opening voice sessions
    pub voice: VoiceboxConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            sound_dir: "sounds".to_string(),
            trigger_file: None,
            voice: VoiceboxConfig::default(),
        }
    }
}

impl BotConfig {
    /// Read settings from `MYNAH_*` environment variables
    ///
    /// Unset variables keep their defaults; the voice settings come from
    /// [`VoiceboxConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            sound_dir: get_env_or("MYNAH_SOUND_DIR", "sounds"),
            trigger_file: std::env::var("MYNAH_TRIGGER_FILE").ok(),
            voice: VoiceboxConfig::from_env(),
        }
    }
}
