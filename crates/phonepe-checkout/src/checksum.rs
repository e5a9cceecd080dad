//! `X-VERIFY` checksum derivation.
//!
//! The gateway recomputes `SHA256(base64Payload + apiPath + saltKey)` on its
//! side, so the order of the three parts and the exact base64 string matter.
//! The salt index is appended after `###` and is never hashed.

use sha2::{Digest, Sha256};

use crate::constants::CHECKSUM_SEPARATOR;
use crate::security::constant_time_eq;

/// Compute the `X-VERIFY` value for an encoded payload.
pub fn sign(encoded_payload: &str, api_path: &str, salt_key: &str, salt_index: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(encoded_payload.as_bytes());
    hasher.update(api_path.as_bytes());
    hasher.update(salt_key.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{digest}{CHECKSUM_SEPARATOR}{salt_index}")
}

/// Check a received checksum against the one derived from the same inputs.
pub fn verify(
    checksum: &str,
    encoded_payload: &str,
    api_path: &str,
    salt_key: &str,
    salt_index: &str,
) -> bool {
    let expected = sign(encoded_payload, api_path, salt_key, salt_index);
    constant_time_eq(expected.as_bytes(), checksum.as_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        })
    }
}
