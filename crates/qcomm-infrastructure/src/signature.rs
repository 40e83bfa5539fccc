//! Decorative SHA-256 signatures.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 over the given parts, separated by `:`.
pub fn sign(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
