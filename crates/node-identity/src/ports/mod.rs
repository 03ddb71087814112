//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driven Ports (Outbound):** what provisioning needs from the host,
//!   currently just durable key storage.

pub mod outbound;

pub use outbound::{InMemoryKVStore, KeyValueStore};
