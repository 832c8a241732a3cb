//! Payload: one unit of audio work

use bytes::Bytes;
use uuid::Uuid;

use mynah_core::ChannelId;

/// An ordered sequence of opaque audio frames targeted at one voice channel.
///
/// Immutable once enqueued. The queue owns it until the consumer task
/// dequeues it; from then on the consumer owns it exclusively.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Identity used to correlate log lines with producer-side activity
    pub name: String,
    /// Voice channel the frames should be streamed into
    pub channel_id: ChannelId,
    /// Pre-encoded frames, sent strictly in this order
    pub frames: Vec<Bytes>,
}

impl Payload {
    /// Create a payload with a generated identity
    pub fn new(channel_id: ChannelId, frames: Vec<Bytes>) -> Self {
        Self {
            name: Uuid::new_v4().to_string(),
            channel_id,
            frames,
        }
    }

    /// Create a payload with a caller-supplied identity (e.g. a sound name)
    pub fn named(name: impl Into<String>, channel_id: ChannelId, frames: Vec<Bytes>) -> Self {
        Self {
            name: name.into(),
            channel_id,
            frames,
        }
    }

    /// Number of frames in this payload
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the payload carries no frames at all
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_are_unique() {
        let a = Payload::new(ChannelId(1), vec![]);
        let b = Payload::new(ChannelId(1), vec![]);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_named_payload() {
        let p = Payload::named("airhorn", ChannelId(5), vec![Bytes::from_static(b"x")]);
        assert_eq!(p.name, "airhorn");
        assert_eq!(p.len(), 1);
        assert!(!p.is_empty());
    }
}
