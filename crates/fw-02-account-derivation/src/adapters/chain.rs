//! # In-Memory Chain
//!
//! Code store standing in for the deployed account registry.

use crate::domain::{AddressDeriver, SubAccount, SubAccountKey};
use crate::errors::ChainError;
use crate::ports::CodeReader;
use async_trait::async_trait;
use shared_types::{Address, Bytes};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory `address → code` map.
#[derive(Debug, Default)]
pub struct InMemoryChain {
    code: RwLock<HashMap<Address, Bytes>>,
}

impl InMemoryChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy the sub-account for `key`. Idempotent: an existing account at
    /// the derived address is left untouched and returned.
    pub fn create_account(
        &self,
        deriver: &AddressDeriver,
        key: &SubAccountKey,
    ) -> Result<SubAccount, ChainError> {
        let account = deriver.sub_account(key);
        let mut code = self.code.write().map_err(|_| poisoned())?;
        code.entry(account.address).or_insert_with(|| {
            debug!(address = %account.address, "sub-account created");
            account.runtime_code.clone()
        });
        Ok(account)
    }

    /// Put arbitrary code at `address`, replacing whatever is there.
    pub fn deploy_code(&self, address: Address, code: Bytes) -> Result<(), ChainError> {
        self.code
            .write()
            .map_err(|_| poisoned())?
            .insert(address, code);
        Ok(())
    }

    /// Number of addresses with code.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.read().map(|code| code.len()).unwrap_or_default()
    }

    /// True if nothing is deployed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CodeReader for InMemoryChain {
    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self
            .code
            .read()
            .map_err(|_| poisoned())?
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }
}

fn poisoned() -> ChainError {
    ChainError::Unavailable("code store lock poisoned".into())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::U256;

    fn key() -> SubAccountKey {
        SubAccountKey {
            implementation: Address::new([0x44; 20]),
            salt: U256::zero(),
            chain_id: U256::from(8453u64),
            owner_contract: Address::new([0x0c; 20]),
            owner_id: U256::from(1u64),
        }
    }

    #[tokio::test]
    async fn test_create_account_is_idempotent() {
        let chain = InMemoryChain::new();
        let deriver = AddressDeriver::new(Address::new([0x33; 20]));

        let first = chain.create_account(&deriver, &key()).unwrap();
        let second = chain.create_account(&deriver, &key()).unwrap();
        assert_eq!(first.address, second.address);
        assert_eq!(chain.len(), 1);

        let code = chain.get_code(first.address).await.unwrap();
        assert_eq!(code, first.runtime_code);
    }

    #[tokio::test]
    async fn test_unknown_address_has_empty_code() {
        let chain = InMemoryChain::new();
        let code = chain.get_code(Address::new([0x01; 20])).await.unwrap();
        assert!(code.is_empty());
        assert!(chain.is_empty());
    }
}
