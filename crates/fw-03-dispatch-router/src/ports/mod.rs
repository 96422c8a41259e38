//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `Module`, the capability the router
//!   forwards calls to
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
