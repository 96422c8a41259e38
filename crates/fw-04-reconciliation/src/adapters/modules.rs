//! # Oracle Modules
//!
//! Router modules serving the oracle calls from in-process oracles. Mint
//! calls are accepted only from configured minters.

use super::calls::{
    balance_of_selector, decode_balance_of, decode_get_experience, decode_mint, decode_mint_batch,
    encode_uint, get_experience_selector, mint_batch_selector, mint_selector,
};
use crate::errors::{MutationError, OracleError};
use crate::ports::{BalanceOracle, LedgerOracle};
use async_trait::async_trait;
use fw_03_dispatch_router::domain::Selector;
use fw_03_dispatch_router::errors::ModuleError;
use fw_03_dispatch_router::ports::{Module, ModuleCall};
use shared_types::{Address, Bytes};
use std::collections::BTreeSet;
use std::sync::Arc;

fn oracle_failure(error: OracleError) -> ModuleError {
    ModuleError::Unavailable(error.to_string())
}

fn mutation_failure(error: MutationError) -> ModuleError {
    match error {
        MutationError::Rejected(reason) => ModuleError::Revert(reason),
        other => ModuleError::Unavailable(other.to_string()),
    }
}

/// Serves `getExperience`.
pub struct LedgerModule<L> {
    ledger: Arc<L>,
}

impl<L: LedgerOracle> LedgerModule<L> {
    /// Module over `ledger`.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L: LedgerOracle> Module for LedgerModule<L> {
    fn selectors(&self) -> Vec<Selector> {
        vec![get_experience_selector()]
    }

    async fn handle(&self, call: ModuleCall) -> Result<Bytes, ModuleError> {
        if call.selector != get_experience_selector() {
            return Err(ModuleError::UnsupportedSelector(call.selector));
        }
        let (entity, track) =
            decode_get_experience(call.calldata.as_slice()).map_err(ModuleError::InvalidCalldata)?;
        let xp = self
            .ledger
            .cumulative_experience(entity, track)
            .await
            .map_err(oracle_failure)?;
        Ok(encode_uint(xp))
    }
}

/// Serves `balanceOf`, `mint` and `mintBatch`.
pub struct ItemsModule<B> {
    balances: Arc<B>,
    minters: BTreeSet<Address>,
}

impl<B: BalanceOracle> ItemsModule<B> {
    /// Module over `balances`, mintable by `minters`.
    pub fn new(balances: Arc<B>, minters: impl IntoIterator<Item = Address>) -> Self {
        Self {
            balances,
            minters: minters.into_iter().collect(),
        }
    }

    fn authorize(&self, caller: Address) -> Result<(), ModuleError> {
        if self.minters.contains(&caller) {
            Ok(())
        } else {
            Err(ModuleError::Revert(format!("{caller} is not a minter")))
        }
    }
}

#[async_trait]
impl<B: BalanceOracle> Module for ItemsModule<B> {
    fn selectors(&self) -> Vec<Selector> {
        vec![balance_of_selector(), mint_selector(), mint_batch_selector()]
    }

    async fn handle(&self, call: ModuleCall) -> Result<Bytes, ModuleError> {
        let calldata = call.calldata.as_slice();

        if call.selector == balance_of_selector() {
            let (account, resource) = decode_balance_of(calldata).map_err(ModuleError::InvalidCalldata)?;
            let balance = self
                .balances
                .get_balance(account, resource)
                .await
                .map_err(oracle_failure)?;
            return Ok(encode_uint(balance));
        }

        if call.selector == mint_selector() {
            self.authorize(call.caller)?;
            let op = decode_mint(calldata).map_err(ModuleError::InvalidCalldata)?;
            self.balances
                .apply_delta(op.account, op.resource, op.amount)
                .await
                .map_err(mutation_failure)?;
            return Ok(Bytes::default());
        }

        if call.selector == mint_batch_selector() {
            self.authorize(call.caller)?;
            let ops = decode_mint_batch(calldata).map_err(ModuleError::InvalidCalldata)?;
            self.balances
                .apply_delta_batch(&ops)
                .await
                .map_err(mutation_failure)?;
            return Ok(Bytes::default());
        }

        Err(ModuleError::UnsupportedSelector(call.selector))
    }
}
