//! # ABI Word Helpers
//!
//! 32-byte word conversions shared by the footer codec, the dispatch router
//! and the routed oracle adapters. Reads past the end of input are
//! zero-filled, matching `EXTCODECOPY`/`CALLDATALOAD` semantics.

use shared_types::{Address, Bytes, U256};

/// Width of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// One ABI word.
pub type Word = [u8; WORD_SIZE];

/// Big-endian word form of an integer.
#[must_use]
pub fn word_from_u256(value: U256) -> Word {
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    word
}

/// Address left-padded to a full word.
#[must_use]
pub fn word_from_address(address: Address) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Integer value of a word.
#[must_use]
pub fn u256_from_word(word: &Word) -> U256 {
    U256::from_big_endian(word)
}

/// Address held in the low 20 bytes of a word. High bytes are ignored.
#[must_use]
pub fn address_from_word(word: &Word) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Address::new(bytes)
}

/// Concatenate words.
#[must_use]
pub fn encode_words(words: &[Word]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * WORD_SIZE);
    for word in words {
        out.extend_from_slice(word);
    }
    out
}

/// Read one word at `offset`, zero-filling anything past the end of `bytes`.
#[must_use]
pub fn read_word(bytes: &[u8], offset: usize) -> Word {
    let mut word = [0u8; WORD_SIZE];
    if offset < bytes.len() {
        let end = bytes.len().min(offset.saturating_add(WORD_SIZE));
        word[..end - offset].copy_from_slice(&bytes[offset..end]);
    }
    word
}

/// Read `count` consecutive words starting at `offset`.
#[must_use]
pub fn decode_words(bytes: &[u8], offset: usize, count: usize) -> Vec<Word> {
    (0..count)
        .map(|i| read_word(bytes, offset.saturating_add(i * WORD_SIZE)))
        .collect()
}

/// Calldata for a call: 4-byte selector followed by static argument words.
#[must_use]
pub fn encode_call(selector: [u8; 4], args: &[Word]) -> Bytes {
    let mut data = Vec::with_capacity(4 + args.len() * WORD_SIZE);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encode_words(args));
    Bytes::from_vec(data)
}

/// Argument area of calldata (everything after the selector).
#[must_use]
pub fn call_args(calldata: &[u8]) -> &[u8] {
    calldata.get(4..).unwrap_or(&[])
}
