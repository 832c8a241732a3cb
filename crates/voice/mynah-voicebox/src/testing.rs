//! Test doubles for the connection provider seam
//!
//! [`MockVoiceBackend`] implements [`ConnectionProvider`] over shared
//! in-memory state: every join, frame and disconnect is recorded in order,
//! connections can be scripted to fail, and frame sends can be gated so a
//! test controls exactly how far playback progresses. Clones share state, so
//! keep one clone for observation and hand another to the registry.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Semaphore;

use mynah_core::{ChannelId, GuildId, MynahError, Result};

use crate::connection::{ConnectionProvider, VoiceConnection};

/// One observation made by the mock transport, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A connection was established
    Joined {
        /// Guild that joined
        guild_id: GuildId,
        /// Channel that was joined
        channel_id: ChannelId,
    },
    /// A frame was accepted by a live connection
    Frame {
        /// Channel the frame was sent to
        channel_id: ChannelId,
        /// The frame bytes
        data: Bytes,
    },
    /// A connection ended, explicitly or through an implicit leave on rejoin
    Disconnected {
        /// Channel the connection pointed at when it ended
        channel_id: ChannelId,
    },
}

type FrameHook = Box<dyn FnMut(usize) + Send>;

#[derive(Default)]
struct BackendState {
    events: Vec<VoiceEvent>,
    frames: usize,
    joins: usize,
    disconnects: usize,
    open: usize,
    max_open: usize,
    next_conn_id: u64,
    // guild -> (live connection id, its channel)
    live: HashMap<GuildId, (u64, ChannelId)>,
    fail_join_channels: HashSet<ChannelId>,
    fail_send_channels: HashSet<ChannelId>,
    gate: Option<Arc<Semaphore>>,
}

/// In-memory voice transport for tests
#[derive(Clone, Default)]
pub struct MockVoiceBackend {
    state: Arc<Mutex<BackendState>>,
    after_frame: Arc<Mutex<Option<FrameHook>>>,
}

impl MockVoiceBackend {
    /// Create a fresh backend with no scripted behavior
    pub fn new() -> Self {
        Self::default()
    }

    /// Make joins to this channel fail; the guild ends up disconnected
    pub fn fail_joins_to(&self, channel_id: ChannelId) {
        self.state
            .lock()
            .unwrap()
            .fail_join_channels
            .insert(channel_id);
    }

    /// Make frame sends on connections to this channel fail promptly
    pub fn fail_sends_to(&self, channel_id: ChannelId) {
        self.state
            .lock()
            .unwrap()
            .fail_send_channels
            .insert(channel_id);
    }

    /// Gate frame sends behind a semaphore that starts with no permits
    ///
    /// Until the test adds permits, every send blocks; each accepted frame
    /// consumes one permit.
    pub fn gate_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.state.lock().unwrap().gate = Some(gate.clone());
        gate
    }

    /// Run a hook after each accepted frame, with the total accepted so far
    ///
    /// The hook runs inside `send_frame`, which makes it the one place a test
    /// can act at an exact point in playback (e.g. signal a skip after frame
    /// two). It must not install another hook.
    pub fn after_frame(&self, hook: impl FnMut(usize) + Send + 'static) {
        *self.after_frame.lock().unwrap() = Some(Box::new(hook));
    }

    /// Everything observed so far, in order
    pub fn events(&self) -> Vec<VoiceEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Frame bytes in acceptance order, all channels interleaved
    pub fn frames_sent(&self) -> Vec<Bytes> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter_map(|event| match event {
                VoiceEvent::Frame { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Channels joined, in join order
    pub fn join_targets(&self) -> Vec<ChannelId> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter_map(|event| match event {
                VoiceEvent::Joined { channel_id, .. } => Some(*channel_id),
                _ => None,
            })
            .collect()
    }

    /// Number of successful joins so far
    pub fn join_count(&self) -> usize {
        self.state.lock().unwrap().joins
    }

    /// Number of connection teardowns so far (explicit and implicit)
    pub fn disconnect_count(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    /// Connections currently live
    pub fn open_connections(&self) -> usize {
        self.state.lock().unwrap().open
    }

    /// Most connections ever live at the same moment
    pub fn max_open_connections(&self) -> usize {
        self.state.lock().unwrap().max_open
    }

    /// Wait until `n` frames have been accepted
    pub async fn wait_for_frames(&self, n: usize) {
        self.wait_until("frames", |state| state.frames >= n).await;
    }

    /// Wait until `n` joins have happened
    pub async fn wait_for_joins(&self, n: usize) {
        self.wait_until("joins", |state| state.joins >= n).await;
    }

    /// Wait until `n` disconnects have happened
    pub async fn wait_for_disconnects(&self, n: usize) {
        self.wait_until("disconnects", |state| state.disconnects >= n)
            .await;
    }

    async fn wait_until(&self, what: &str, pred: impl Fn(&BackendState) -> bool) {
        for _ in 0..500 {
            if pred(&self.state.lock().unwrap()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("mock backend timed out waiting for {}", what);
    }
}

#[async_trait]
impl ConnectionProvider for MockVoiceBackend {
    async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Box<dyn VoiceConnection>> {
        let mut state = self.state.lock().unwrap();

        // Joining, successfully or not, always ends the previous connection.
        if let Some((_, old_channel)) = state.live.remove(&guild_id) {
            state.open -= 1;
            state.disconnects += 1;
            state.events.push(VoiceEvent::Disconnected {
                channel_id: old_channel,
            });
        }

        if state.fail_join_channels.contains(&channel_id) {
            return Err(MynahError::join_failed(
                guild_id,
                channel_id,
                "scripted join failure",
            ));
        }

        let conn_id = state.next_conn_id;
        state.next_conn_id += 1;
        state.live.insert(guild_id, (conn_id, channel_id));
        state.open += 1;
        state.max_open = state.max_open.max(state.open);
        state.joins += 1;
        state.events.push(VoiceEvent::Joined {
            guild_id,
            channel_id,
        });

        Ok(Box::new(MockConnection {
            backend: self.clone(),
            guild_id,
            channel_id,
            conn_id,
        }))
    }
}

struct MockConnection {
    backend: MockVoiceBackend,
    guild_id: GuildId,
    channel_id: ChannelId,
    conn_id: u64,
}

#[async_trait]
impl VoiceConnection for MockConnection {
    async fn send_frame(&mut self, frame: Bytes) -> Result<()> {
        let gate = {
            let state = self.backend.state.lock().unwrap();
            if state.fail_send_channels.contains(&self.channel_id) {
                return Err(MynahError::gateway("scripted send failure"));
            }
            state.gate.clone()
        };
        if let Some(gate) = gate {
            // Closing never happens; a pending acquire is simply dropped
            // when the caller gives up on the send.
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(MynahError::gateway("send gate closed")),
            }
        }

        let count = {
            let mut state = self.backend.state.lock().unwrap();
            match state.live.get(&self.guild_id) {
                Some((live_id, _)) if *live_id == self.conn_id => {}
                _ => return Err(MynahError::gateway("connection is closed")),
            }
            state.frames += 1;
            state.events.push(VoiceEvent::Frame {
                channel_id: self.channel_id,
                data: frame,
            });
            state.frames
        };

        if let Some(hook) = self.backend.after_frame.lock().unwrap().as_mut() {
            hook(count);
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        let mut state = self.backend.state.lock().unwrap();
        // Only the connection that is still live for its guild tears down;
        // a handle superseded by a rejoin already counted its disconnect.
        match state.live.get(&self.guild_id) {
            Some((live_id, _)) if *live_id == self.conn_id => {
                state.live.remove(&self.guild_id);
                state.open -= 1;
                state.disconnects += 1;
                let channel_id = self.channel_id;
                state.events.push(VoiceEvent::Disconnected { channel_id });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_join_frame_disconnect_in_order() {
        let backend = MockVoiceBackend::new();
        let mut conn = backend.join(GuildId(1), ChannelId(2)).await.unwrap();
        conn.send_frame(Bytes::from_static(b"a")).await.unwrap();
        conn.disconnect().await;

        assert_eq!(
            backend.events(),
            vec![
                VoiceEvent::Joined {
                    guild_id: GuildId(1),
                    channel_id: ChannelId(2)
                },
                VoiceEvent::Frame {
                    channel_id: ChannelId(2),
                    data: Bytes::from_static(b"a")
                },
                VoiceEvent::Disconnected {
                    channel_id: ChannelId(2)
                },
            ]
        );
        assert_eq!(backend.open_connections(), 0);
        assert_eq!(backend.max_open_connections(), 1);
    }

    #[tokio::test]
    async fn test_rejoin_counts_implicit_leave() {
        let backend = MockVoiceBackend::new();
        let mut first = backend.join(GuildId(1), ChannelId(2)).await.unwrap();
        let _second = backend.join(GuildId(1), ChannelId(3)).await.unwrap();

        assert_eq!(backend.max_open_connections(), 1);
        assert_eq!(backend.disconnect_count(), 1);

        // The superseded handle is inert now
        assert!(first.send_frame(Bytes::from_static(b"x")).await.is_err());
        first.disconnect().await;
        assert_eq!(backend.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_join_failure_leaves_guild_disconnected() {
        let backend = MockVoiceBackend::new();
        backend.fail_joins_to(ChannelId(9));

        let _conn = backend.join(GuildId(1), ChannelId(2)).await.unwrap();
        let err = backend.join(GuildId(1), ChannelId(9)).await.err().unwrap();
        assert!(matches!(err, MynahError::JoinFailed { .. }));
        assert_eq!(backend.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_gated_send_waits_for_permit() {
        let backend = MockVoiceBackend::new();
        let gate = backend.gate_sends();
        let mut conn = backend.join(GuildId(1), ChannelId(2)).await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), conn.send_frame(Bytes::new())).await;
        assert!(blocked.is_err());

        gate.add_permits(1);
        conn.send_frame(Bytes::new()).await.unwrap();
        assert_eq!(backend.frames_sent().len(), 1);
    }
}
