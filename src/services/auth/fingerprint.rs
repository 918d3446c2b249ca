//! Log-safe token identifiers.
//!
//! Raw credentials never reach the logs. A truncated SHA-256 digest is enough
//! to correlate two log lines about the same token without making it usable.
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 6;

pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
