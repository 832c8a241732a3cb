//! Test doubles for the chat surface
//!
//! Mirrors the voice transport mock in `mynah_voicebox::testing`: a
//! recording gateway whose clones share state, so tests hand one copy to
//! the bot and observe outbound traffic on another.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mynah_core::{ChannelId, MessageId, MynahError, Result};

use crate::gateway::ChatGateway;

/// One outbound call a test gateway observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRecord {
    /// A message was posted
    Message {
        /// Target channel
        channel_id: ChannelId,
        /// Body text
        text: String,
    },
    /// A reaction was attached
    Reaction {
        /// Channel of the reacted-to message
        channel_id: ChannelId,
        /// The reacted-to message
        message_id: MessageId,
        /// Emoji used
        emoji: String,
    },
}

/// In-memory gateway that records calls instead of talking to a server
#[derive(Clone, Default)]
pub struct RecordingGateway {
    records: Arc<Mutex<Vec<ChatRecord>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl RecordingGateway {
    /// Create a gateway with an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `send_message` fail
    pub fn fail_sends(&self) {
        *self.fail_sends.lock().unwrap() = true;
    }

    /// Everything recorded so far, in call order
    pub fn records(&self) -> Vec<ChatRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Bodies of recorded messages, in call order
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|record| match record {
                ChatRecord::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Poll until at least `count` records exist; panics after five seconds
    pub async fn wait_for_records(&self, count: usize) {
        for _ in 0..500 {
            if self.records.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "recording gateway timed out waiting for {} records, saw {}",
            count,
            self.records.lock().unwrap().len()
        );
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_message(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        if *self.fail_sends.lock().unwrap() {
            return Err(MynahError::gateway("scripted send failure"));
        }
        self.records.lock().unwrap().push(ChatRecord::Message {
            channel_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<()> {
        self.records.lock().unwrap().push(ChatRecord::Reaction {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_records() {
        let gateway = RecordingGateway::new();
        let handle = gateway.clone();

        handle.send_message(ChannelId(1), "hello").await.unwrap();
        assert_eq!(gateway.messages(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_send_failure() {
        let gateway = RecordingGateway::new();
        gateway.fail_sends();
        assert!(gateway.send_message(ChannelId(1), "x").await.is_err());
        assert!(gateway.records().is_empty());
    }
}
