//! # Oracle Calls
//!
//! Selectors and calldata for the four operations the engine needs from a
//! routed deployment.
//!
//! | Signature | Returns |
//! |-----------|---------|
//! | `getExperience(uint256,uint32)` | `uint256` |
//! | `balanceOf(address,uint256)` | `uint256` |
//! | `mint(address,uint256,uint256)` | nothing |
//! | `mintBatch((address,uint256,uint256)[])` | nothing |

use crate::domain::{DeltaOp, EntityId, ResourceId, TrackId};
use fw_01_binding_codec::abi::{
    address_from_word, call_args, encode_call, read_word, u256_from_word, word_from_address,
    word_from_u256, Word, WORD_SIZE,
};
use fw_03_dispatch_router::domain::Selector;
use shared_types::{Address, Bytes, U256};

/// Ledger read.
pub const GET_EXPERIENCE: &str = "getExperience(uint256,uint32)";
/// Balance read.
pub const BALANCE_OF: &str = "balanceOf(address,uint256)";
/// Single credit.
pub const MINT: &str = "mint(address,uint256,uint256)";
/// Batched credit.
pub const MINT_BATCH: &str = "mintBatch((address,uint256,uint256)[])";

/// Selector of [`GET_EXPERIENCE`].
#[must_use]
pub fn get_experience_selector() -> Selector {
    Selector::from_signature(GET_EXPERIENCE)
}

/// Selector of [`BALANCE_OF`].
#[must_use]
pub fn balance_of_selector() -> Selector {
    Selector::from_signature(BALANCE_OF)
}

/// Selector of [`MINT`].
#[must_use]
pub fn mint_selector() -> Selector {
    Selector::from_signature(MINT)
}

/// Selector of [`MINT_BATCH`].
#[must_use]
pub fn mint_batch_selector() -> Selector {
    Selector::from_signature(MINT_BATCH)
}

// =============================================================================
// ENCODING
// =============================================================================

/// `getExperience(entity, track)`.
#[must_use]
pub fn encode_get_experience(entity: EntityId, track: TrackId) -> Bytes {
    encode_call(
        *get_experience_selector().as_bytes(),
        &[word_from_u256(entity.0), word_from_u256(U256::from(track.0))],
    )
}

/// `balanceOf(account, resource)`.
#[must_use]
pub fn encode_balance_of(account: Address, resource: ResourceId) -> Bytes {
    encode_call(
        *balance_of_selector().as_bytes(),
        &[word_from_address(account), word_from_u256(U256::from(resource.0))],
    )
}

/// `mint(account, resource, amount)`.
#[must_use]
pub fn encode_mint(op: &DeltaOp) -> Bytes {
    encode_call(*mint_selector().as_bytes(), &op_words(op))
}

/// `mintBatch(ops)`: head offset, length, then the tuples inline.
#[must_use]
pub fn encode_mint_batch(ops: &[DeltaOp]) -> Bytes {
    let mut args: Vec<Word> = Vec::with_capacity(2 + ops.len() * 3);
    args.push(word_from_u256(U256::from(WORD_SIZE)));
    args.push(word_from_u256(U256::from(ops.len())));
    for op in ops {
        args.extend(op_words(op));
    }
    encode_call(*mint_batch_selector().as_bytes(), &args)
}

fn op_words(op: &DeltaOp) -> [Word; 3] {
    [
        word_from_address(op.account),
        word_from_u256(U256::from(op.resource.0)),
        word_from_u256(op.amount),
    ]
}

/// A single `uint256` return value.
#[must_use]
pub fn encode_uint(value: U256) -> Bytes {
    Bytes::from_vec(word_from_u256(value).to_vec())
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a `uint256` return value. `None` if shorter than a word.
#[must_use]
pub fn decode_uint(output: &[u8]) -> Option<U256> {
    (output.len() >= WORD_SIZE).then(|| u256_from_word(&read_word(output, 0)))
}

fn arg(calldata: &[u8], index: usize) -> Result<Word, String> {
    let args = call_args(calldata);
    let offset = index * WORD_SIZE;
    if args.len() < offset + WORD_SIZE {
        return Err(format!("missing argument {index}"));
    }
    Ok(read_word(args, offset))
}

fn narrow_u64(value: U256, what: &str) -> Result<u64, String> {
    if value > U256::from(u64::MAX) {
        return Err(format!("{what} out of range"));
    }
    Ok(value.low_u64())
}

/// Arguments of `getExperience`.
pub fn decode_get_experience(calldata: &[u8]) -> Result<(EntityId, TrackId), String> {
    let entity = EntityId(u256_from_word(&arg(calldata, 0)?));
    let track = u256_from_word(&arg(calldata, 1)?);
    if track > U256::from(u32::MAX) {
        return Err("track out of range".into());
    }
    Ok((entity, TrackId(track.low_u32())))
}

/// Arguments of `balanceOf`.
pub fn decode_balance_of(calldata: &[u8]) -> Result<(Address, ResourceId), String> {
    let account = address_from_word(&arg(calldata, 0)?);
    let resource = narrow_u64(u256_from_word(&arg(calldata, 1)?), "resource")?;
    Ok((account, ResourceId(resource)))
}

/// Arguments of `mint`.
pub fn decode_mint(calldata: &[u8]) -> Result<DeltaOp, String> {
    Ok(DeltaOp {
        account: address_from_word(&arg(calldata, 0)?),
        resource: ResourceId(narrow_u64(u256_from_word(&arg(calldata, 1)?), "resource")?),
        amount: u256_from_word(&arg(calldata, 2)?),
    })
}

/// Arguments of `mintBatch`.
pub fn decode_mint_batch(calldata: &[u8]) -> Result<Vec<DeltaOp>, String> {
    let args = call_args(calldata);
    let head = usize::try_from(narrow_u64(u256_from_word(&arg(calldata, 0)?), "offset")?)
        .map_err(|_| "offset out of range".to_string())?;
    if args.len() < head.saturating_add(WORD_SIZE) {
        return Err("array length out of bounds".into());
    }
    let count = usize::try_from(narrow_u64(u256_from_word(&read_word(args, head)), "length")?)
        .map_err(|_| "length out of range".to_string())?;
    let body = head + WORD_SIZE;
    let needed = count
        .checked_mul(3 * WORD_SIZE)
        .and_then(|n| n.checked_add(body))
        .ok_or_else(|| "length out of range".to_string())?;
    if args.len() < needed {
        return Err(format!("expected {count} tuples, calldata too short"));
    }

    (0..count)
        .map(|i| {
            let at = body + i * 3 * WORD_SIZE;
            Ok(DeltaOp {
                account: address_from_word(&read_word(args, at)),
                resource: ResourceId(narrow_u64(u256_from_word(&read_word(args, at + WORD_SIZE)), "resource")?),
                amount: u256_from_word(&read_word(args, at + 2 * WORD_SIZE)),
            })
        })
        .collect()
}
