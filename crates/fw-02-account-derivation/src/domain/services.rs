//! # Domain Services
//!
//! Pure derivation: CREATE2 addresses, the `AddressDeriver`, and migration
//! planning. No I/O.

use super::entities::{ImplementationRecord, MigrationEntry, SubAccount, SubAccountKey};
use super::proxy::{creation_code, runtime_code};
use fw_01_binding_codec::codec::encode_footer;
use fw_01_binding_codec::domain::FooterLayout;
use shared_types::{keccak256, Address, Hash, U256};

// =============================================================================
// CREATE2
// =============================================================================

/// Compute a CREATE2 address.
///
/// `keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code))[12..]`
#[must_use]
pub fn compute_create2_address(deployer: Address, salt: Hash, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);

    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(deployer.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(code_hash.as_bytes());

    let hash = keccak256(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..32]);
    Address::new(addr)
}

// =============================================================================
// ADDRESS DERIVER
// =============================================================================

/// Derives sub-account addresses for one registry.
///
/// Derivation is pure: the address depends only on the registry and the
/// [`SubAccountKey`]. Whether anything lives there is answered by
/// `AddressDeriver::inspect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDeriver {
    registry: Address,
    layout: FooterLayout,
}

impl AddressDeriver {
    /// Deriver for `registry`, assuming accounts read the current runtime layout.
    #[must_use]
    pub const fn new(registry: Address) -> Self {
        Self {
            registry,
            layout: FooterLayout::RUNTIME,
        }
    }

    /// Deriver for the registry and layout of a record.
    #[must_use]
    pub fn from_record(record: &ImplementationRecord) -> Self {
        Self {
            registry: record.registry,
            layout: record.layout,
        }
    }

    /// CREATE2 deployer.
    #[must_use]
    pub const fn registry(&self) -> Address {
        self.registry
    }

    /// Layout deployed accounts read their footer with.
    #[must_use]
    pub const fn layout(&self) -> FooterLayout {
        self.layout
    }

    /// Key for an owner under `record`.
    #[must_use]
    pub fn key_for(
        record: &ImplementationRecord,
        chain_id: U256,
        owner_contract: Address,
        owner_id: U256,
        salt: U256,
    ) -> SubAccountKey {
        SubAccountKey {
            implementation: record.implementation,
            salt,
            chain_id,
            owner_contract,
            owner_id,
        }
    }

    /// Derived address of `key`.
    #[must_use]
    pub fn derive(&self, key: &SubAccountKey) -> Address {
        let footer = encode_footer(&key.footer());
        let init_code = creation_code(key.implementation, &footer);
        compute_create2_address(
            self.registry,
            Hash::from_u256(key.salt),
            init_code.as_slice(),
        )
    }

    /// Five-argument form of [`AddressDeriver::derive`].
    #[must_use]
    pub fn derive_from(
        &self,
        implementation: Address,
        salt: U256,
        chain_id: U256,
        owner_contract: Address,
        owner_id: U256,
    ) -> Address {
        self.derive(&SubAccountKey {
            implementation,
            salt,
            chain_id,
            owner_contract,
            owner_id,
        })
    }

    /// Address, footer and expected runtime code of `key`.
    #[must_use]
    pub fn sub_account(&self, key: &SubAccountKey) -> SubAccount {
        let footer = key.footer();
        SubAccount {
            address: self.derive(key),
            key: *key,
            footer,
            runtime_code: runtime_code(key.implementation, &encode_footer(&footer)),
        }
    }
}

// =============================================================================
// MIGRATION
// =============================================================================

/// Old and new addresses for each owner when moving between records.
///
/// A changed implementation always means a new address; the old account is
/// left as is. Returns nothing when both records derive identically.
#[must_use]
pub fn plan_migration(
    from: &ImplementationRecord,
    to: &ImplementationRecord,
    chain_id: U256,
    salt: U256,
    owner_contract: Address,
    owners: &[U256],
) -> Vec<MigrationEntry> {
    if from.implementation == to.implementation && from.registry == to.registry {
        return Vec::new();
    }
    let old = AddressDeriver::from_record(from);
    let new = AddressDeriver::from_record(to);

    owners
        .iter()
        .map(|owner_id| {
            let from_key = AddressDeriver::key_for(from, chain_id, owner_contract, *owner_id, salt);
            let to_key = AddressDeriver::key_for(to, chain_id, owner_contract, *owner_id, salt);
            MigrationEntry {
                owner_id: *owner_id,
                from_address: old.derive(&from_key),
                to_address: new.derive(&to_key),
            }
        })
        .collect()
}
