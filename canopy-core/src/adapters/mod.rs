//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - In-memory store for tests and ephemeral use
//! - JSON file store for the CLI's local data
//! - Demo data generator for first-run seeding

pub mod demo;
pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;
