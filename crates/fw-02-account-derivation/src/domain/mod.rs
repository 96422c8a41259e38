//! # Domain Layer
//!
//! Proxy byte layout, CREATE2 derivation and migration planning.
//! NO I/O, NO async.

pub mod entities;
pub mod proxy;
pub mod services;

pub use entities::*;
pub use proxy::{creation_code, implementation_from_runtime, runtime_code};
pub use services::*;
