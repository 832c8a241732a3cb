//! Named sound storage
//!
//! Sounds live as `.snd` frame containers in a single directory, one file
//! per sound. Decoded frame lists are cached after the first load so a
//! popular trigger does not reread its file on every message.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mynah_core::{MynahError, Result};
use mynah_voicebox::frames;

/// Directory-backed store of named sounds
pub struct Soundbank {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<Vec<Bytes>>>>,
}

impl Soundbank {
    /// Create a soundbank over a directory of `.snd` files
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Frames for a named sound, loading and caching on first use
    ///
    /// Fails with `UnknownSound` when no file backs the name, and with
    /// `Soundbite` when the file exists but its container is malformed.
    pub async fn frames(&self, name: &str) -> Result<Arc<Vec<Bytes>>> {
        validate_name(name)?;
        if let Some(frames) = self.cache.read().await.get(name) {
            return Ok(frames.clone());
        }

        let path = self.dir.join(format!("{}.snd", name));
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MynahError::unknown_sound(name));
            }
            Err(err) => return Err(err.into()),
        };
        let decoded = Arc::new(frames::read_frames(&raw)?);
        debug!(sound = %name, frame_count = %decoded.len(), "Loaded sound");

        self.cache
            .write()
            .await
            .insert(name.to_string(), decoded.clone());
        Ok(decoded)
    }

    /// Load every valid `.snd` file in the directory into the cache
    ///
    /// Malformed files are skipped with a warning so one bad sound cannot
    /// block startup. Returns how many sounds loaded.
    pub async fn preload(&self) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut loaded = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = sound_name(&path) else {
                continue;
            };
            match self.frames(&name).await {
                Ok(_) => loaded += 1,
                Err(err) => {
                    warn!(sound = %name, error = %err, "Skipping unloadable sound")
                }
            }
        }
        Ok(loaded)
    }

    /// Names currently resident in the cache, unordered
    pub async fn cached_names(&self) -> Vec<String> {
        self.cache.read().await.keys().cloned().collect()
    }
}

/// Stem of a `.snd` path when it carries a valid sound name
fn sound_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("snd") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    validate_name(stem).ok()?;
    Some(stem.to_string())
}

/// Sound names are lowercase alphanumerics plus `-` and `_`
///
/// The name becomes a file stem, so anything else is rejected before it
/// touches the filesystem.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(MynahError::soundbite(format!(
            "invalid sound name {:?}",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mynah_core::MynahError;

    fn write_sound(dir: &Path, name: &str, payloads: &[&[u8]]) {
        let payloads: Vec<Bytes> = payloads.iter().map(|f| Bytes::copy_from_slice(f)).collect();
        let encoded = mynah_voicebox::frames::write_frames(&payloads).unwrap();
        std::fs::write(dir.join(format!("{}.snd", name)), encoded).unwrap();
    }

    #[tokio::test]
    async fn test_load_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_sound(dir.path(), "toot", &[b"one", b"two"]);
        let bank = Soundbank::new(dir.path());

        let frames = bank.frames("toot").await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], Bytes::from_static(b"one"));

        // Cached copy survives file removal
        std::fs::remove_file(dir.path().join("toot.snd")).unwrap();
        let again = bank.frames("toot").await.unwrap();
        assert_eq!(again.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_sound() {
        let dir = tempfile::tempdir().unwrap();
        let bank = Soundbank::new(dir.path());
        let err = bank.frames("ghost").await.unwrap_err();
        assert!(matches!(err, MynahError::UnknownSound(_)));
    }

    #[tokio::test]
    async fn test_rejects_traversal_names() {
        let dir = tempfile::tempdir().unwrap();
        let bank = Soundbank::new(dir.path());
        for name in ["../etc/passwd", "UPPER", "spa ce", "dot.dot", ""] {
            assert!(bank.frames(name).await.is_err(), "accepted {:?}", name);
        }
    }

    #[tokio::test]
    async fn test_preload_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        write_sound(dir.path(), "good", &[b"ok"]);
        std::fs::write(dir.path().join("bad.snd"), [0xff]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let bank = Soundbank::new(dir.path());
        let loaded = bank.preload().await.unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(bank.cached_names().await, vec!["good".to_string()]);
    }
}
