//! Prompt fingerprinting, so logs can tell which prompt revision produced an output.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`short_hash`].
const SHORT_HASH_LEN: usize = 12;

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
        let _ = write!(hex, "{:02x}", byte);
        hex
    })
}

/// The first few characters of [`hash_prompt`], for log lines.
pub fn short_hash(prompt: &str) -> String {
    let mut full = hash_prompt(prompt);
    full.truncate(SHORT_HASH_LEN);
    full
}
