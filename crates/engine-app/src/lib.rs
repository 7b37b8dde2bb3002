//! Application layer for the QuestWright engine.
//!
//! Every narrative operation flows dispatch → validation → service →
//! repository mutation → audit/event emission, and nothing in here talks to
//! SQLite or the transport directly.

pub mod application;
