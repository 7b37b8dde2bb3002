//! Adapter implementations of the QuestWright engine's outbound ports.

pub mod infrastructure;
