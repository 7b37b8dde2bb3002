//! Tool handlers: thin glue from the wire contract to the services.
//!
//! Each module registers its group's tools; `catalog` assembles the full
//! registry at composition time.

pub mod catalog;

mod batch_tools;
mod character_tools;
mod combat_tools;
mod improvisation_tools;
mod log_tools;
mod quest_tools;
mod rest_tools;
mod theft_tools;
mod world_tools;

pub use catalog::Services;
