//! Event dispatch
//!
//! One incoming event at a time: voice state updates fold into the
//! occupancy tracker, messages go through trigger lookup and fan out to
//! one task per action. A slow, failing, or panicking action never stalls
//! the gateway loop or its sibling actions.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, warn};

use mynah_core::{ChatEvent, MessageEvent};

use crate::context::{BotContext, EventContext};
use crate::triggers::TriggerStore;

/// Routes gateway events through the trigger store into running actions
pub struct Dispatcher {
    bot: BotContext,
    triggers: Arc<dyn TriggerStore>,
}

impl Dispatcher {
    /// Create a dispatcher over shared bot state and a trigger source
    pub fn new(bot: BotContext, triggers: Arc<dyn TriggerStore>) -> Self {
        Self { bot, triggers }
    }

    /// The shared state this dispatcher executes actions against
    pub fn context(&self) -> &BotContext {
        &self.bot
    }

    /// Handle one gateway event to completion
    pub async fn handle_event(&self, event: ChatEvent) {
        match event {
            ChatEvent::VoiceState(event) => self.bot.occupancy.apply(&event).await,
            ChatEvent::Message(event) => self.handle_message(event).await,
        }
    }

    async fn handle_message(&self, event: MessageEvent) {
        let actions = match self.triggers.actions_for(&event).await {
            Ok(actions) => actions,
            Err(err) => {
                error!(
                    message_id = %event.message_id,
                    error = %err,
                    "Trigger lookup failed"
                );
                return;
            }
        };
        if actions.is_empty() {
            return;
        }
        debug!(
            message_id = %event.message_id,
            action_count = %actions.len(),
            "Message matched triggers"
        );

        let origin = EventContext::from_message(&event);
        let handles: Vec<_> = actions
            .into_iter()
            .map(|action| {
                let bot = self.bot.clone();
                tokio::spawn(async move {
                    let name = action.name();
                    if let Err(err) = action.execute(&bot, &origin).await {
                        warn!(action = %name, error = %err, "Action failed");
                    }
                })
            })
            .collect();

        for result in join_all(handles).await {
            if let Err(err) = result {
                error!(error = %err, "Action task aborted");
            }
        }
    }
}
