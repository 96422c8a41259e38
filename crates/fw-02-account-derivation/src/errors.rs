//! # Error Types
//!
//! Chain read errors and derivation failures. Not-materialized and
//! stale-binding are separate variants because they recover differently.

use crate::domain::StaleBinding;
use shared_types::Address;
use thiserror::Error;

/// Errors reading code from the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The code source could not be reached.
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// The code source answered but the read for this address failed.
    #[error("code read failed for {address}: {reason}")]
    ReadFailed {
        /// Address being read.
        address: Address,
        /// Backend message.
        reason: String,
    },
}

/// Errors from requiring a usable sub-account.
#[derive(Debug, Clone, Error)]
pub enum DerivationError {
    /// Nothing is deployed at the derived address. Recovery: create the account.
    #[error("sub-account {address} is not materialized")]
    NotMaterialized {
        /// Derived address.
        address: Address,
    },

    /// Code is deployed but its binding is wrong. Recovery: derive a new
    /// address under a conforming implementation.
    #[error("stale binding at {} ({})", .0.address, .0.reason)]
    StaleBinding(Box<StaleBinding>),

    /// Reading the chain failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_materialized_display() {
        let err = DerivationError::NotMaterialized {
            address: Address::new([0xab; 20]),
        };
        assert!(err.to_string().contains("not materialized"));
    }

    #[test]
    fn test_chain_error_converts() {
        let err: DerivationError = ChainError::Unavailable("rpc down".into()).into();
        assert!(matches!(err, DerivationError::Chain(_)));
        assert_eq!(err.to_string(), "chain unavailable: rpc down");
    }
}
