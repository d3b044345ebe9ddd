//! Key derivation for scatter order and key authentication.
//!
//! The secret key is digested once with SHA-256. The first four digest bytes
//! become the authentication prefix stored in the carrier header, the whole
//! digest is folded into the `u64` seed that drives the permutation. The key
//! never encrypts anything; it only decides where payload bits land and lets
//! a decode reject a wrong key before touching the body.

use byteorder::{BigEndian, ByteOrder};
use sha2::{Digest, Sha256};

use crate::error::LowkeyError;
use crate::result::Result;

/// Everything the codec derives from a secret key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMaterial {
    /// First four digest bytes, stored in the header to authenticate the key.
    pub auth_prefix: [u8; 4],
    /// XOR fold of the digest's four big-endian u64 lanes, seeds the shuffle.
    pub seed: u64,
}

pub fn derive_key(secret: &str) -> Result<KeyMaterial> {
    if secret.is_empty() {
        return Err(LowkeyError::EmptyKey);
    }

    let digest = Sha256::digest(secret.as_bytes());

    let mut auth_prefix = [0u8; 4];
    auth_prefix.copy_from_slice(&digest[..4]);

    let seed = digest
        .chunks_exact(8)
        .map(|lane| BigEndian::read_u64(lane))
        .fold(0u64, |acc, lane| acc ^ lane);

    Ok(KeyMaterial { auth_prefix, seed })
}
