//! # Error Types
//!
//! Batch-edit rejections, dispatch failures and module failures. Every
//! variant that concerns a selector carries it.

use crate::domain::{CutAction, Selector};
use shared_types::Address;
use thiserror::Error;

// =============================================================================
// CUT ERRORS
// =============================================================================

/// Why a batch edit was rejected. A rejected batch changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutError {
    /// The batch has no cuts.
    #[error("empty cut batch")]
    EmptyBatch,

    /// A cut lists no selectors.
    #[error("cut {cut_index} ({action}) lists no selectors")]
    EmptySelectorList {
        /// Position of the cut in the batch.
        cut_index: usize,
        /// Its action.
        action: CutAction,
    },

    /// `Add` or `Replace` naming the zero address.
    #[error("cut {cut_index} ({action}) targets the zero address")]
    ZeroModule {
        /// Position of the cut in the batch.
        cut_index: usize,
        /// Its action.
        action: CutAction,
    },

    /// `Remove` must name the zero address.
    #[error("cut {cut_index} (remove) names module {module}; removal takes the zero address")]
    RemoveWithModule {
        /// Position of the cut in the batch.
        cut_index: usize,
        /// Address given.
        module: Address,
    },

    /// `Add` of a selector that is already routed.
    #[error("selector {selector} already bound to {module}")]
    SelectorAlreadyBound {
        /// Offending selector.
        selector: Selector,
        /// Module it is bound to (after earlier cuts in the batch).
        module: Address,
    },

    /// `Replace` or `Remove` of a selector that is not routed.
    #[error("selector {selector} is not bound ({action})")]
    SelectorNotBound {
        /// Offending selector.
        selector: Selector,
        /// Action that needed the binding.
        action: CutAction,
    },

    /// `Add` or `Replace` naming an address with no deployed module.
    #[error("no module deployed at {module} (selector {selector})")]
    ModuleNotDeployed {
        /// Address named by the cut.
        module: Address,
        /// First selector the cut would route there.
        selector: Selector,
    },
}

// =============================================================================
// MODULE ERRORS
// =============================================================================

/// Failure raised by a module while handling a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// Module refused the call.
    #[error("revert: {0}")]
    Revert(String),

    /// Module is routed a selector it does not implement.
    #[error("unsupported selector {0}")]
    UnsupportedSelector(Selector),

    /// Calldata could not be decoded.
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),

    /// Backing state could not be reached.
    #[error("module unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// DISPATCH ERRORS
// =============================================================================

/// Why a call could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Calldata shorter than a selector.
    #[error("calldata too short: {len} bytes")]
    CalldataTooShort {
        /// Calldata length.
        len: usize,
    },

    /// No module serves this selector.
    #[error("no implementation for selector {0}")]
    NoImplementation(Selector),

    /// The routed module failed.
    #[error("module {module} failed on {selector}: {source}")]
    Module {
        /// Selector called.
        selector: Selector,
        /// Module it was routed to.
        module: Address,
        /// Module failure.
        #[source]
        source: ModuleError,
    },
}

/// Errors deploying a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// Modules cannot live at the zero address.
    #[error("cannot deploy a module at the zero address")]
    ZeroAddress,

    /// Module identity is immutable.
    #[error("address {0} already holds a module")]
    AddressInUse(Address),
}
