//! Shared-secret checks.

use sha2::{Digest, Sha256};

/// Compare a caller-supplied secret with the configured one.
///
/// Both sides are hashed first so the comparison always walks 32 bytes,
/// whatever the input lengths, and never exits early.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
