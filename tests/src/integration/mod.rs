//! # Integration Flows

pub mod derivation_flow;
pub mod router_flow;
pub mod runtime_flow;
