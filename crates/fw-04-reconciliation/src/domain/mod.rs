//! # Domain Layer
//!
//! Identifiers, policy, correction planning, batching, retry schedule and
//! reports. NO I/O, NO async.

pub mod correction;
pub mod policy;
pub mod report;
pub mod retry;
pub mod value_objects;

pub use correction::*;
pub use policy::*;
pub use report::*;
pub use retry::*;
pub use value_objects::*;
