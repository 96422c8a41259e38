//! # Driven Ports (SPI - Outbound)
//!
//! The only chain access derivation needs: reading deployed code.

use crate::errors::ChainError;
use async_trait::async_trait;
use shared_types::{Address, Bytes};

/// Read access to deployed code.
#[async_trait]
pub trait CodeReader: Send + Sync {
    /// Runtime code at `address`. Empty when nothing is deployed.
    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError>;
}
