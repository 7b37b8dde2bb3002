//! Port traits for the QuestWright engine.
//!
//! Outbound ports are implemented by adapters (SQLite, system clock, seeded
//! RNG); inbound types describe what the transport hands to the application
//! layer.

pub mod inbound;
pub mod outbound;
