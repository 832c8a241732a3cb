//! Trigger-driven chat bot core
//!
//! Wires the chat surface to the voice dispatch layer:
//!
//! - [`Dispatcher`] consumes gateway events one at a time
//! - [`TriggerStore`] maps message text to [`Action`] lists
//! - Actions execute concurrently against the shared [`BotContext`]
//! - [`Soundbank`] and [`Occupancy`] resolve what to play and where
//! - [`Lifecycle`] fans restart and shutdown requests out to the host

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod gateway;
pub mod lifecycle;
pub mod occupancy;
pub mod soundbank;
pub mod testing;
pub mod triggers;

pub use actions::Action;
pub use config::BotConfig;
pub use context::{BotContext, EventContext};
pub use dispatch::Dispatcher;
pub use gateway::ChatGateway;
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleReceiver};
pub use occupancy::Occupancy;
pub use soundbank::Soundbank;
pub use triggers::{StaticTriggerTable, TriggerEntry, TriggerStore};
