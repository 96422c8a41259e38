//! # Materialization Inspection
//!
//! Compares what is deployed at a derived address with what the derivation
//! says must be there, and classifies the difference.

use crate::domain::{
    implementation_from_runtime, AccountStatus, AddressDeriver, StaleBinding, StaleReason,
    SubAccount, SubAccountKey,
};
use crate::errors::{ChainError, DerivationError};
use crate::ports::CodeReader;
use fw_01_binding_codec::codec::decode_footer;
use fw_01_binding_codec::conformance::verify_layout_at;
use fw_01_binding_codec::domain::{FooterLayout, RUNTIME_FOOTER_OFFSET};
use tracing::{debug, instrument, warn};

impl AddressDeriver {
    /// Classify the account at `key`'s derived address.
    ///
    /// - no code: [`AccountStatus::NotMaterialized`]
    /// - code that is not the expected proxy, or a binding the deployed
    ///   implementation misreads: [`AccountStatus::StaleBinding`]
    /// - otherwise: [`AccountStatus::Materialized`]
    #[instrument(skip_all, fields(key = %key))]
    pub async fn inspect(
        &self,
        key: &SubAccountKey,
        reader: &dyn CodeReader,
    ) -> Result<AccountStatus, ChainError> {
        let expected = self.sub_account(key);
        let code = reader.get_code(expected.address).await?;

        if code.is_empty() {
            debug!(address = %expected.address, "no code at derived address");
            return Ok(AccountStatus::NotMaterialized {
                address: expected.address,
            });
        }

        let found_implementation = implementation_from_runtime(code.as_slice());
        let reason = if found_implementation != Some(key.implementation) {
            Some(StaleReason::ImplementationMismatch)
        } else if code != expected.runtime_code {
            Some(StaleReason::FooterMismatch)
        } else if verify_layout_at(&self.layout(), RUNTIME_FOOTER_OFFSET).is_err() {
            Some(StaleReason::NonConformingLayout)
        } else {
            None
        };

        match reason {
            None => Ok(AccountStatus::Materialized(expected)),
            Some(reason) => {
                warn!(address = %expected.address, %reason, "stale binding");
                Ok(AccountStatus::StaleBinding(Box::new(StaleBinding {
                    address: expected.address,
                    reason,
                    expected_implementation: key.implementation,
                    found_implementation,
                    found_footer: decode_footer(code.as_slice(), FooterLayout::RUNTIME),
                    legacy_view: decode_footer(code.as_slice(), FooterLayout::LEGACY_RUNTIME),
                })))
            }
        }
    }

    /// Like [`AddressDeriver::inspect`], but anything other than a usable
    /// account is an error.
    pub async fn ensure_materialized(
        &self,
        key: &SubAccountKey,
        reader: &dyn CodeReader,
    ) -> Result<SubAccount, DerivationError> {
        match self.inspect(key, reader).await? {
            AccountStatus::Materialized(account) => Ok(account),
            AccountStatus::NotMaterialized { address } => {
                Err(DerivationError::NotMaterialized { address })
            }
            AccountStatus::StaleBinding(stale) => Err(DerivationError::StaleBinding(stale)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryChain;
    use crate::domain::{runtime_code, ImplementationRecord};
    use fw_01_binding_codec::codec::encode_footer;
    use shared_types::{Address, U256};

    const REGISTRY: Address = Address::new([0x33; 20]);
    const OWNER_CONTRACT: Address = Address::new([0x0c; 20]);

    fn record(layout: FooterLayout) -> ImplementationRecord {
        ImplementationRecord::new("account", 2, Address::new([0x44; 20]), REGISTRY).with_layout(layout)
    }

    fn key_for(record: &ImplementationRecord) -> SubAccountKey {
        AddressDeriver::key_for(record, U256::from(8453u64), OWNER_CONTRACT, U256::from(7u64), U256::zero())
    }

    #[tokio::test]
    async fn test_not_materialized_before_creation() {
        let record = record(FooterLayout::RUNTIME);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();

        let status = deriver.inspect(&key_for(&record), &chain).await.unwrap();
        assert!(matches!(status, AccountStatus::NotMaterialized { .. }));

        let err = deriver
            .ensure_materialized(&key_for(&record), &chain)
            .await
            .unwrap_err();
        assert!(matches!(err, DerivationError::NotMaterialized { .. }));
    }

    #[tokio::test]
    async fn test_materialized_after_creation() {
        let record = record(FooterLayout::RUNTIME);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key_for(&record);

        let created = chain.create_account(&deriver, &key).unwrap();
        let account = deriver.ensure_materialized(&key, &chain).await.unwrap();
        assert_eq!(account.address, created.address);
        assert_eq!(account.footer.owner_id, U256::from(7u64));
    }

    #[tokio::test]
    async fn test_legacy_layout_is_stale_not_missing() {
        let record = record(FooterLayout::LEGACY_RUNTIME);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key_for(&record);
        chain.create_account(&deriver, &key).unwrap();

        let status = deriver.inspect(&key, &chain).await.unwrap();
        let AccountStatus::StaleBinding(stale) = status else {
            panic!("expected stale binding");
        };
        assert_eq!(stale.reason, StaleReason::NonConformingLayout);
        // Current layout reads the true binding; the legacy view is shifted.
        assert_eq!(stale.found_footer.owner_contract(), Some(OWNER_CONTRACT));
        assert_eq!(stale.legacy_view.owner_id(), Some(OWNER_CONTRACT.to_u256()));
        assert_eq!(stale.legacy_view.owner_contract().map(|a| a.to_u256()), Some(U256::from(8453u64)));

        let err = deriver.ensure_materialized(&key, &chain).await.unwrap_err();
        assert!(matches!(err, DerivationError::StaleBinding(_)));
    }

    #[tokio::test]
    async fn test_foreign_code_is_implementation_mismatch() {
        let record = record(FooterLayout::RUNTIME);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key_for(&record);

        let other = runtime_code(Address::new([0x99; 20]), &encode_footer(&key.footer()));
        chain.deploy_code(deriver.derive(&key), other).unwrap();

        let status = deriver.inspect(&key, &chain).await.unwrap();
        let AccountStatus::StaleBinding(stale) = status else {
            panic!("expected stale binding");
        };
        assert_eq!(stale.reason, StaleReason::ImplementationMismatch);
        assert_eq!(stale.found_implementation, Some(Address::new([0x99; 20])));
    }

    #[tokio::test]
    async fn test_wrong_footer_is_footer_mismatch() {
        let record = record(FooterLayout::RUNTIME);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key_for(&record);

        let wrong = SubAccountKey { owner_id: U256::from(8u64), ..key };
        let code = runtime_code(key.implementation, &encode_footer(&wrong.footer()));
        chain.deploy_code(deriver.derive(&key), code).unwrap();

        let status = deriver.inspect(&key, &chain).await.unwrap();
        assert!(matches!(
            status,
            AccountStatus::StaleBinding(ref stale) if stale.reason == StaleReason::FooterMismatch
        ));
    }
}
