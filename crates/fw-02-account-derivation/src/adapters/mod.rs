//! # Adapters Layer
//!
//! In-memory code store for tests and embedding.

pub mod chain;

pub use chain::InMemoryChain;
