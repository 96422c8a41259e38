//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `CodeReader`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
