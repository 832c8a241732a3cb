//! Per-guild voice session: bounded payload queue, control signals, and the
//! consumer task that paces frames into the live connection
//!
//! One [`Voicebox`] exists per guild. Producers push [`Payload`]s through its
//! bounded queue and signal it with `skip`/`pause`/`stop`; the consumer task
//! owns the connection handle exclusively and is the only code that touches
//! it. Raising `quit` is the one and only way the task ends, and the task
//! ending is the one and only way the connection is finally released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{sleep, sleep_until, timeout, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mynah_core::{ChannelId, GuildId, MynahError, Result};

use crate::config::{Capabilities, VoiceboxConfig};
use crate::connection::{ConnectionProvider, VoiceConnection};
use crate::payload::Payload;

/// How often the consumer re-checks signals while playback is paused
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to one guild's voice session
///
/// Cheap to share behind an `Arc`. All methods are non-blocking except
/// [`Voicebox::close`], which waits for the consumer task to exit.
pub struct Voicebox {
    guild_id: GuildId,
    capabilities: Capabilities,
    queue_tx: mpsc::Sender<Payload>,
    skip_tx: mpsc::Sender<()>,
    stop_tx: mpsc::Sender<()>,
    paused: Arc<AtomicBool>,
    quit: CancellationToken,
    exited: CancellationToken,
}

impl Voicebox {
    /// Start a session: create the queue and signal channels and spawn the
    /// consumer task. The registry is the only caller.
    pub(crate) fn spawn(
        guild_id: GuildId,
        idle_channel: Option<ChannelId>,
        provider: Arc<dyn ConnectionProvider>,
        config: VoiceboxConfig,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_length.max(1));
        // Capacity 1: at most one pending skip/stop is meaningful
        let (skip_tx, skip_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let paused = Arc::new(AtomicBool::new(false));
        let quit = CancellationToken::new();
        let exited = CancellationToken::new();

        let sender = PayloadSender {
            guild_id,
            idle_channel,
            provider,
            config: config.clone(),
            queue_rx,
            skip_rx,
            stop_rx,
            paused: paused.clone(),
            quit: quit.clone(),
            conn: None,
            current_channel: None,
        };

        // The guard trips even if the task panics, so close() never hangs
        let exit_guard = exited.clone().drop_guard();
        tokio::spawn(async move {
            let _exit_guard = exit_guard;
            sender.run().await;
        });

        Self {
            guild_id,
            capabilities: config.capabilities,
            queue_tx,
            skip_tx,
            stop_tx,
            paused,
            quit,
            exited,
        }
    }

    /// Guild this session belongs to
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Capability flags this session was opened with
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// True once `quit` has been raised
    pub fn is_closed(&self) -> bool {
        self.quit.is_cancelled()
    }

    /// True while playback is held by a pause
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Queue a payload without blocking
    ///
    /// Fails with `QueueFull` when the queue is at capacity: dropping is the
    /// point — stale audio is worse than no audio. Fails with `NoSession`
    /// once the session has quit.
    pub fn enqueue(&self, payload: Payload) -> Result<()> {
        if self.quit.is_cancelled() {
            return Err(MynahError::no_session(self.guild_id));
        }
        debug!(
            guild_id = %self.guild_id,
            channel_id = %payload.channel_id,
            payload = %payload.name,
            frames = payload.frames.len(),
            "Queueing payload"
        );
        match self.queue_tx.try_send(payload) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(payload)) => {
                debug!(
                    guild_id = %self.guild_id,
                    payload = %payload.name,
                    "Voice queue full, payload dropped"
                );
                Err(MynahError::queue_full(self.guild_id))
            }
            Err(TrySendError::Closed(_)) => Err(MynahError::no_session(self.guild_id)),
        }
    }

    /// Abandon the currently-playing payload at the next frame boundary
    ///
    /// Queued payloads are unaffected. Extra skips while one is already
    /// pending are no-ops.
    pub fn skip(&self) -> Result<()> {
        if !self.capabilities.skippable {
            return Err(MynahError::capability_disabled(self.guild_id, "skippable"));
        }
        if self.quit.is_cancelled() {
            return Err(MynahError::no_session(self.guild_id));
        }
        // Full just means a skip is already pending
        let _ = self.skip_tx.try_send(());
        Ok(())
    }

    /// Toggle pause; returns the new paused state
    ///
    /// The hold applies between frames: an in-flight frame send completes
    /// first, and quit/skip/stop all still work while paused.
    pub fn pause(&self) -> Result<bool> {
        if !self.capabilities.pausable {
            return Err(MynahError::capability_disabled(self.guild_id, "pausable"));
        }
        if self.quit.is_cancelled() {
            return Err(MynahError::no_session(self.guild_id));
        }
        let now_paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        info!(guild_id = %self.guild_id, paused = now_paused, "Pause toggled");
        Ok(now_paused)
    }

    /// Abandon the current payload and drain everything queued behind it
    pub fn stop(&self) -> Result<()> {
        if !self.capabilities.stoppable {
            return Err(MynahError::capability_disabled(self.guild_id, "stoppable"));
        }
        if self.quit.is_cancelled() {
            return Err(MynahError::no_session(self.guild_id));
        }
        let _ = self.stop_tx.try_send(());
        Ok(())
    }

    /// Raise `quit` and wait for the consumer task to exit
    ///
    /// Safe to call repeatedly and from several tasks at once; every caller
    /// waits for the actual exit.
    pub async fn close(&self) {
        self.quit.cancel();
        self.exited.cancelled().await;
    }
}

impl Drop for Voicebox {
    fn drop(&mut self) {
        // A dropped handle can no longer be closed; the consumer must not
        // outlive its last owner.
        self.quit.cancel();
    }
}

/// How one payload's playback ended
enum PlayOutcome {
    Completed,
    Skipped { sent: usize },
    Stopped { sent: usize, drained: usize },
    TimedOut { sent: usize },
    Failed { sent: usize },
    Quit,
}

/// Why a pause hold ended
enum PauseBreak {
    Resumed,
    Skipped,
    Stopped { drained: usize },
    Quit,
}

/// Consumer task state: pulls payloads, maintains the connection, paces
/// frames. Runs until `quit`.
struct PayloadSender {
    guild_id: GuildId,
    idle_channel: Option<ChannelId>,
    provider: Arc<dyn ConnectionProvider>,
    config: VoiceboxConfig,
    queue_rx: mpsc::Receiver<Payload>,
    skip_rx: mpsc::Receiver<()>,
    stop_rx: mpsc::Receiver<()>,
    paused: Arc<AtomicBool>,
    quit: CancellationToken,
    conn: Option<Box<dyn VoiceConnection>>,
    current_channel: Option<ChannelId>,
}

impl PayloadSender {
    async fn run(mut self) {
        debug!(guild_id = %self.guild_id, "Voicebox consumer started");
        self.join_idle().await;

        let mut idle_armed = false;
        let mut idle_deadline = Instant::now();

        loop {
            // Branch order is the priority order: quit beats a ready payload,
            // and a ready payload beats the idle timer.
            tokio::select! {
                biased;

                _ = self.quit.cancelled() => break,

                maybe_payload = self.queue_rx.recv() => {
                    let Some(payload) = maybe_payload else {
                        // Every handle is gone; their Drop raised quit.
                        break;
                    };
                    self.clear_stale_signals();
                    self.play(payload).await;
                    if self.quit.is_cancelled() {
                        break;
                    }
                    idle_armed = true;
                    idle_deadline = Instant::now() + self.config.idle_timeout;
                }

                _ = sleep_until(idle_deadline), if idle_armed => {
                    // Fires once per payload, not every tick; only the next
                    // payload re-arms it.
                    idle_armed = false;
                    self.join_idle().await;
                }
            }
        }

        self.release_connection().await;
        debug!(guild_id = %self.guild_id, "Voicebox consumer stopped");
    }

    /// Dispatch one payload: join its channel, stream its frames, log how it
    /// went. Every failure in here is payload-scoped.
    async fn play(&mut self, payload: Payload) {
        debug!(
            guild_id = %self.guild_id,
            channel_id = %payload.channel_id,
            payload = %payload.name,
            frames = payload.frames.len(),
            "Dispatching payload"
        );

        if !self.ensure_joined(payload.channel_id).await {
            return;
        }

        match self.stream_frames(&payload).await {
            PlayOutcome::Completed => {
                debug!(
                    guild_id = %self.guild_id,
                    payload = %payload.name,
                    "Payload complete"
                );
            }
            PlayOutcome::Skipped { sent } => {
                info!(
                    guild_id = %self.guild_id,
                    payload = %payload.name,
                    sent,
                    "Payload skipped"
                );
            }
            PlayOutcome::Stopped { sent, drained } => {
                info!(
                    guild_id = %self.guild_id,
                    payload = %payload.name,
                    sent,
                    drained,
                    "Playback stopped, queue drained"
                );
            }
            PlayOutcome::TimedOut { sent } => {
                warn!(
                    guild_id = %self.guild_id,
                    channel_id = %payload.channel_id,
                    payload = %payload.name,
                    sent,
                    timeout_ms = self.config.send_timeout.as_millis() as u64,
                    "Frame send timed out, abandoning payload"
                );
                // The connection is stalled; discard it so the next payload
                // starts from a fresh join.
                self.release_connection().await;
            }
            PlayOutcome::Failed { sent } => {
                warn!(
                    guild_id = %self.guild_id,
                    channel_id = %payload.channel_id,
                    payload = %payload.name,
                    sent,
                    "Frame send failed, abandoning payload"
                );
                self.release_connection().await;
            }
            PlayOutcome::Quit => {}
        }
    }

    /// Stream the payload's frames in order, checking signals before every
    /// frame so a ready backlog can never starve cancellation.
    async fn stream_frames(&mut self, payload: &Payload) -> PlayOutcome {
        let mut sent = 0usize;
        for frame in &payload.frames {
            if self.quit.is_cancelled() {
                return PlayOutcome::Quit;
            }
            if self.stop_rx.try_recv().is_ok() {
                let drained = self.drain_queue();
                return PlayOutcome::Stopped { sent, drained };
            }
            if self.skip_rx.try_recv().is_ok() {
                return PlayOutcome::Skipped { sent };
            }
            if self.paused.load(Ordering::SeqCst) {
                match self.hold_while_paused().await {
                    PauseBreak::Resumed => {}
                    PauseBreak::Skipped => return PlayOutcome::Skipped { sent },
                    PauseBreak::Stopped { drained } => {
                        return PlayOutcome::Stopped { sent, drained }
                    }
                    PauseBreak::Quit => return PlayOutcome::Quit,
                }
            }

            let Some(conn) = self.conn.as_mut() else {
                return PlayOutcome::Failed { sent };
            };
            tokio::select! {
                biased;

                _ = self.quit.cancelled() => return PlayOutcome::Quit,

                result = timeout(self.config.send_timeout, conn.send_frame(frame.clone())) => {
                    match result {
                        Ok(Ok(())) => sent += 1,
                        Ok(Err(e)) => {
                            warn!(
                                guild_id = %self.guild_id,
                                payload = %payload.name,
                                error = %e,
                                "Connection rejected frame"
                            );
                            return PlayOutcome::Failed { sent };
                        }
                        Err(_) => return PlayOutcome::TimedOut { sent },
                    }
                }
            }
        }
        PlayOutcome::Completed
    }

    /// Hold between frames while paused, still honoring quit/skip/stop
    async fn hold_while_paused(&mut self) -> PauseBreak {
        info!(guild_id = %self.guild_id, "Playback paused");
        loop {
            if self.quit.is_cancelled() {
                return PauseBreak::Quit;
            }
            if self.stop_rx.try_recv().is_ok() {
                let drained = self.drain_queue();
                return PauseBreak::Stopped { drained };
            }
            if self.skip_rx.try_recv().is_ok() {
                return PauseBreak::Skipped;
            }
            if !self.paused.load(Ordering::SeqCst) {
                info!(guild_id = %self.guild_id, "Playback resumed");
                return PauseBreak::Resumed;
            }
            tokio::select! {
                biased;

                _ = self.quit.cancelled() => return PauseBreak::Quit,

                _ = sleep(PAUSE_POLL_INTERVAL) => {}
            }
        }
    }

    /// Make sure the connection points at `channel_id`; true on success
    async fn ensure_joined(&mut self, channel_id: ChannelId) -> bool {
        if self.conn.is_some() && self.current_channel == Some(channel_id) {
            return true;
        }
        match self.provider.join(self.guild_id, channel_id).await {
            Ok(conn) => {
                // The provider performed the implicit leave on a rejoin, so
                // overwriting the old handle does not leak a connection.
                self.conn = Some(conn);
                self.current_channel = Some(channel_id);
                info!(
                    guild_id = %self.guild_id,
                    channel_id = %channel_id,
                    "Joined voice channel"
                );
                true
            }
            Err(e) => {
                warn!(
                    guild_id = %self.guild_id,
                    channel_id = %channel_id,
                    error = %e,
                    "Voice join failed, dropping payload"
                );
                self.release_connection().await;
                false
            }
        }
    }

    /// Re-join the configured idle channel, or hold no connection at all
    /// when none is configured. Failures only get logged: the session keeps
    /// waiting for payloads either way.
    async fn join_idle(&mut self) {
        match self.idle_channel {
            Some(channel_id) => {
                if self.conn.is_some() && self.current_channel == Some(channel_id) {
                    return;
                }
                match self.provider.join(self.guild_id, channel_id).await {
                    Ok(conn) => {
                        self.conn = Some(conn);
                        self.current_channel = Some(channel_id);
                        debug!(
                            guild_id = %self.guild_id,
                            channel_id = %channel_id,
                            "Joined idle channel"
                        );
                    }
                    Err(e) => {
                        debug!(
                            guild_id = %self.guild_id,
                            channel_id = %channel_id,
                            error = %e,
                            "Idle channel join failed"
                        );
                    }
                }
            }
            None => {
                self.release_connection().await;
            }
        }
    }

    /// Idempotent disconnect of whatever handle is held
    async fn release_connection(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            conn.disconnect().await;
            debug!(guild_id = %self.guild_id, "Voice connection released");
        }
        self.current_channel = None;
    }

    /// Drop skip/stop signals aimed at an earlier payload so they cannot
    /// leak into the one about to play
    fn clear_stale_signals(&mut self) {
        while self.skip_rx.try_recv().is_ok() {}
        while self.stop_rx.try_recv().is_ok() {}
    }

    /// Throw away everything currently queued; returns how many
    fn drain_queue(&mut self) -> usize {
        let mut drained = 0;
        while self.queue_rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockVoiceBackend;
    use bytes::Bytes;

    fn quick_config() -> VoiceboxConfig {
        VoiceboxConfig {
            queue_length: 4,
            send_timeout: Duration::from_millis(200),
            idle_timeout: Duration::from_secs(60),
            capabilities: Capabilities::default(),
        }
    }

    fn one_frame_payload(channel: u64) -> Payload {
        Payload::named("test-sound", ChannelId(channel), vec![Bytes::from_static(b"frame")])
    }

    #[tokio::test]
    async fn test_enqueue_after_close_returns_no_session() {
        let backend = MockVoiceBackend::new();
        let vb = Voicebox::spawn(
            GuildId(1),
            None,
            Arc::new(backend),
            quick_config(),
        );
        vb.close().await;

        let err = vb.enqueue(one_frame_payload(10)).unwrap_err();
        assert!(matches!(err, MynahError::NoSession { .. }));
    }

    #[tokio::test]
    async fn test_signals_require_capabilities() {
        let backend = MockVoiceBackend::new();
        let vb = Voicebox::spawn(GuildId(2), None, Arc::new(backend), quick_config());

        assert!(matches!(
            vb.skip().unwrap_err(),
            MynahError::CapabilityDisabled { capability: "skippable", .. }
        ));
        assert!(matches!(
            vb.pause().unwrap_err(),
            MynahError::CapabilityDisabled { capability: "pausable", .. }
        ));
        assert!(matches!(
            vb.stop().unwrap_err(),
            MynahError::CapabilityDisabled { capability: "stoppable", .. }
        ));

        vb.close().await;
    }

    #[tokio::test]
    async fn test_pause_toggles() {
        let backend = MockVoiceBackend::new();
        let config = VoiceboxConfig {
            capabilities: Capabilities::all(),
            ..quick_config()
        };
        let vb = Voicebox::spawn(GuildId(3), None, Arc::new(backend), config);

        assert!(!vb.is_paused());
        assert!(vb.pause().unwrap());
        assert!(vb.is_paused());
        assert!(!vb.pause().unwrap());
        assert!(!vb.is_paused());

        vb.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent_on_the_handle() {
        let backend = MockVoiceBackend::new();
        let vb = Voicebox::spawn(GuildId(4), None, Arc::new(backend), quick_config());

        vb.close().await;
        vb.close().await;
        assert!(vb.is_closed());
    }

    #[tokio::test]
    async fn test_drop_ends_the_consumer() {
        let backend = MockVoiceBackend::new();
        let vb = Voicebox::spawn(
            GuildId(5),
            Some(ChannelId(50)),
            Arc::new(backend.clone()),
            quick_config(),
        );
        backend.wait_for_joins(1).await;
        drop(vb);

        backend.wait_for_disconnects(1).await;
        assert_eq!(backend.open_connections(), 0);
    }
}
