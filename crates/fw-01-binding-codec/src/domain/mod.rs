//! # Domain Layer
//!
//! Footer fields, the versioned layout, and decoded views.
//! NO I/O, NO async.

pub mod footer;
pub mod layout;

pub use footer::*;
pub use layout::*;
