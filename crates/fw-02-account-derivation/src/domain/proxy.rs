//! # Delegating Proxy Code
//!
//! Byte layout of the minimal delegating proxy each sub-account is deployed
//! as (ERC-6551 reference form):
//!
//! ```text
//! creation: 3d60ad80600a3d3981f3 | runtime
//! runtime:  363d3d373d3d3d363d73 | implementation (20) | 5af43d82803e903d91602b57fd5bf3 | footer (128)
//! ```
//!
//! The constructor prefix copies 0xad (173) bytes of runtime code, which is
//! the 45-byte runtime preamble plus the footer.

use fw_01_binding_codec::domain::{FOOTER_SIZE, RUNTIME_FOOTER_OFFSET};
use shared_types::{Address, Bytes};

/// Constructor that returns the runtime code.
pub const CONSTRUCTOR_PREFIX: [u8; 10] = [0x3d, 0x60, 0xad, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x81, 0xf3];

/// Runtime bytes before the implementation address (ends in `PUSH20`).
pub const RUNTIME_HEAD: [u8; 10] = [0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];

/// Runtime bytes after the implementation address (`DELEGATECALL` and return).
pub const RUNTIME_TAIL: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Offset of the implementation address inside runtime code.
pub const IMPLEMENTATION_OFFSET: usize = RUNTIME_HEAD.len();

/// Runtime preamble length. Equal to the footer's runtime offset.
pub const RUNTIME_PREAMBLE_LEN: usize = RUNTIME_HEAD.len() + 20 + RUNTIME_TAIL.len();

/// Creation preamble length.
pub const CREATION_PREAMBLE_LEN: usize = CONSTRUCTOR_PREFIX.len() + RUNTIME_PREAMBLE_LEN;

const _: () = assert!(RUNTIME_PREAMBLE_LEN == RUNTIME_FOOTER_OFFSET);
const _: () = assert!(RUNTIME_PREAMBLE_LEN + FOOTER_SIZE == 0xad);

/// Runtime code of a sub-account delegating to `implementation`.
#[must_use]
pub fn runtime_code(implementation: Address, footer: &[u8]) -> Bytes {
    let mut code = Vec::with_capacity(RUNTIME_PREAMBLE_LEN + footer.len());
    code.extend_from_slice(&RUNTIME_HEAD);
    code.extend_from_slice(implementation.as_bytes());
    code.extend_from_slice(&RUNTIME_TAIL);
    code.extend_from_slice(footer);
    Bytes::from_vec(code)
}

/// Init code hashed into the CREATE2 address.
#[must_use]
pub fn creation_code(implementation: Address, footer: &[u8]) -> Bytes {
    let runtime = runtime_code(implementation, footer);
    let mut code = Vec::with_capacity(CONSTRUCTOR_PREFIX.len() + runtime.len());
    code.extend_from_slice(&CONSTRUCTOR_PREFIX);
    code.extend_from_slice(runtime.as_slice());
    Bytes::from_vec(code)
}

/// Implementation a piece of runtime code delegates to, if it is a proxy of
/// this shape at all.
#[must_use]
pub fn implementation_from_runtime(code: &[u8]) -> Option<Address> {
    if code.len() < RUNTIME_PREAMBLE_LEN {
        return None;
    }
    let tail_start = IMPLEMENTATION_OFFSET + 20;
    if code[..IMPLEMENTATION_OFFSET] != RUNTIME_HEAD
        || code[tail_start..RUNTIME_PREAMBLE_LEN] != RUNTIME_TAIL
    {
        return None;
    }
    Address::from_slice(&code[IMPLEMENTATION_OFFSET..tail_start])
}
