//! # Derived Account Resolver
//!
//! Resolves an entity to its CREATE2 sub-account under one implementation
//! record. With a code reader attached, the account must also be
//! materialized with a conforming binding; otherwise the entity is skipped.

use crate::domain::EntityId;
use crate::errors::ResolveError;
use crate::ports::AccountResolver;
use async_trait::async_trait;
use fw_02_account_derivation::domain::{AddressDeriver, ImplementationRecord};
use fw_02_account_derivation::errors::DerivationError;
use fw_02_account_derivation::ports::CodeReader;
use shared_types::{Address, U256};
use std::sync::Arc;

/// Entity resolver backed by address derivation.
pub struct DerivedAccountResolver {
    deriver: AddressDeriver,
    record: ImplementationRecord,
    chain_id: U256,
    owner_contract: Address,
    salt: U256,
    code: Option<Arc<dyn CodeReader>>,
}

impl DerivedAccountResolver {
    /// Resolver for entities of `owner_contract` on `chain_id`, salt zero,
    /// without a materialization check.
    #[must_use]
    pub fn new(record: ImplementationRecord, chain_id: U256, owner_contract: Address) -> Self {
        Self {
            deriver: AddressDeriver::from_record(&record),
            record,
            chain_id,
            owner_contract,
            salt: U256::zero(),
            code: None,
        }
    }

    /// Use a non-zero salt.
    #[must_use]
    pub fn with_salt(mut self, salt: U256) -> Self {
        self.salt = salt;
        self
    }

    /// Require accounts to be materialized and conforming.
    #[must_use]
    pub fn with_code_reader(mut self, code: Arc<dyn CodeReader>) -> Self {
        self.code = Some(code);
        self
    }

    /// Implementation record in use.
    #[must_use]
    pub fn record(&self) -> &ImplementationRecord {
        &self.record
    }
}

#[async_trait]
impl AccountResolver for DerivedAccountResolver {
    async fn resolve(&self, entity: EntityId) -> Result<Address, ResolveError> {
        let key = AddressDeriver::key_for(&self.record, self.chain_id, self.owner_contract, entity.0, self.salt);

        let Some(code) = &self.code else {
            return Ok(self.deriver.derive(&key));
        };

        match self.deriver.ensure_materialized(&key, code.as_ref()).await {
            Ok(account) => Ok(account.address),
            Err(DerivationError::NotMaterialized { address }) => {
                Err(ResolveError::NotMaterialized { entity, address })
            }
            Err(DerivationError::StaleBinding(stale)) => Err(ResolveError::StaleBinding {
                entity,
                address: stale.address,
                reason: stale.reason.to_string(),
            }),
            Err(DerivationError::Chain(e)) => Err(ResolveError::Unavailable {
                entity,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_01_binding_codec::domain::FooterLayout;
    use fw_02_account_derivation::adapters::InMemoryChain;

    const REGISTRY: Address = Address::new([0x33; 20]);
    const OWNER_CONTRACT: Address = Address::new([0x0c; 20]);

    fn record() -> ImplementationRecord {
        ImplementationRecord::new("account", 3, Address::new([0x44; 20]), REGISTRY)
    }

    #[tokio::test]
    async fn test_resolves_to_derived_address() {
        let resolver = DerivedAccountResolver::new(record(), U256::from(8453u64), OWNER_CONTRACT);
        let entity = EntityId::from_u64(7);
        let expected = AddressDeriver::from_record(&record()).derive_from(
            record().implementation,
            U256::zero(),
            U256::from(8453u64),
            OWNER_CONTRACT,
            U256::from(7u64),
        );
        assert_eq!(resolver.resolve(entity).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_materialization_is_checked_with_a_reader() {
        let chain = Arc::new(InMemoryChain::new());
        let resolver = DerivedAccountResolver::new(record(), U256::from(8453u64), OWNER_CONTRACT)
            .with_code_reader(chain.clone());
        let entity = EntityId::from_u64(7);

        assert!(matches!(
            resolver.resolve(entity).await,
            Err(ResolveError::NotMaterialized { .. })
        ));

        let key = AddressDeriver::key_for(&record(), U256::from(8453u64), OWNER_CONTRACT, entity.0, U256::zero());
        let account = chain.create_account(&AddressDeriver::from_record(&record()), &key).unwrap();
        assert_eq!(resolver.resolve(entity).await.unwrap(), account.address);
    }

    #[tokio::test]
    async fn test_nonconforming_record_is_stale() {
        let chain = Arc::new(InMemoryChain::new());
        let legacy = record().with_layout(FooterLayout::LEGACY_RUNTIME);
        let resolver = DerivedAccountResolver::new(legacy.clone(), U256::from(8453u64), OWNER_CONTRACT)
            .with_code_reader(chain.clone());
        let entity = EntityId::from_u64(9);
        let key = AddressDeriver::key_for(&legacy, U256::from(8453u64), OWNER_CONTRACT, entity.0, U256::zero());
        chain.create_account(&AddressDeriver::from_record(&legacy), &key).unwrap();

        match resolver.resolve(entity).await {
            Err(ResolveError::StaleBinding { reason, .. }) => assert!(reason.contains("layout")),
            other => panic!("expected stale binding, got {other:?}"),
        }
    }
}
