//! Trigger lookup
//!
//! A trigger maps a phrase to the actions the bot takes when a message
//! contains it. The store is consulted once per message; every matching
//! trigger contributes its actions in table order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mynah_core::{MessageEvent, Result};

use crate::actions::Action;

/// Source of trigger definitions
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// All actions the given message fires, in trigger order
    async fn actions_for(&self, event: &MessageEvent) -> Result<Vec<Action>>;
}

/// One phrase-to-actions mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEntry {
    /// Matched case-insensitively as a substring of the message text
    pub phrase: String,
    /// Actions taken when the phrase matches
    pub actions: Vec<Action>,
}

/// Fixed, in-memory trigger table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTriggerTable {
    entries: Vec<TriggerEntry>,
}

impl StaticTriggerTable {
    /// Build a table from entries, kept in the given order
    pub fn new(entries: Vec<TriggerEntry>) -> Self {
        Self { entries }
    }

    /// Parse a table from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append one entry to the table
    pub fn push(&mut self, phrase: impl Into<String>, actions: Vec<Action>) {
        self.entries.push(TriggerEntry {
            phrase: phrase.into(),
            actions,
        });
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TriggerStore for StaticTriggerTable {
    async fn actions_for(&self, event: &MessageEvent) -> Result<Vec<Action>> {
        let text = event.text.to_lowercase();
        let mut actions = Vec::new();
        for entry in &self.entries {
            if !entry.phrase.is_empty() && text.contains(&entry.phrase.to_lowercase()) {
                actions.extend(entry.actions.iter().cloned());
            }
        }
        Ok(actions)
    }
}
