// src/services/password.rs
//! Password digest scheme for local accounts.
//!
//! The legacy scheme is a double PBKDF2-HMAC-SHA256 with fixed, label-derived
//! salts. Fixed salts keep `hash` deterministic: identical passwords yield
//! identical digests across users. That weakness is preserved because every
//! stored digest was produced this way and must keep verifying.
//! New deployments can opt into per-user random salts with
//! `PASSWORD_DIGEST_SCHEME=random`, which emits a versioned `v2$` digest that
//! coexists with legacy digests.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use std::env;

const SALT_SIZE: usize = 16;
const HASH_SIZE: usize = 32;
const ITERATIONS: u32 = 10_000;

const FIRST_SALT_LABEL: &str = "FirstHashSalt";
const SECOND_SALT_LABEL: &str = "SecondHashSalt";
const V2_PREFIX: &str = "v2$";

/// Which digest format `hash` produces. Verification always accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    /// Legacy deterministic double hash with fixed salts.
    FixedSalt,
    /// Per-password random salt, single PBKDF2 pass, `v2$` prefix.
    RandomSalt,
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    scheme: DigestScheme,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DigestScheme::FixedSalt)
    }
}

impl PasswordHasher {
    pub fn new(scheme: DigestScheme) -> Self {
        Self { scheme }
    }

    pub fn from_env() -> Self {
        let scheme = match env::var("PASSWORD_DIGEST_SCHEME").as_deref() {
            Ok("random") => DigestScheme::RandomSalt,
            _ => DigestScheme::FixedSalt,
        };
        Self::new(scheme)
    }

    /// Produce a digest for a new password. Empty input is allowed and simply
    /// runs through the KDF like any other string.
    pub fn hash(&self, password: &str) -> String {
        match self.scheme {
            DigestScheme::FixedSalt => Self::hash_fixed(password),
            DigestScheme::RandomSalt => Self::hash_random(password),
        }
    }

    /// Check a password against a stored digest. Dispatches on the digest
    /// format, so old and new digests verify regardless of the configured
    /// scheme for new hashes.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        if let Some(encoded) = stored.strip_prefix(V2_PREFIX) {
            return Self::verify_random(password, encoded);
        }
        let computed = Self::hash_fixed(password);
        constant_time_eq(computed.as_bytes(), stored.as_bytes())
    }

    fn hash_fixed(password: &str) -> String {
        let first = Self::derive_fixed(password, FIRST_SALT_LABEL);
        Self::derive_fixed(&first, SECOND_SALT_LABEL)
    }

    fn derive_fixed(input: &str, salt_label: &str) -> String {
        let salt = fixed_salt(salt_label);
        let mut hash = [0u8; HASH_SIZE];
        pbkdf2_hmac::<Sha256>(input.as_bytes(), &salt, ITERATIONS, &mut hash);

        let mut combined = Vec::with_capacity(SALT_SIZE + HASH_SIZE);
        combined.extend_from_slice(&salt);
        combined.extend_from_slice(&hash);
        BASE64.encode(combined)
    }

    fn hash_random(password: &str) -> String {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);

        let mut hash = [0u8; HASH_SIZE];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut hash);

        let mut combined = Vec::with_capacity(SALT_SIZE + HASH_SIZE);
        combined.extend_from_slice(&salt);
        combined.extend_from_slice(&hash);
        format!("{}{}", V2_PREFIX, BASE64.encode(combined))
    }

    fn verify_random(password: &str, encoded: &str) -> bool {
        let combined = match BASE64.decode(encoded.as_bytes()) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        if combined.len() != SALT_SIZE + HASH_SIZE {
            return false;
        }
        let (salt, stored_hash) = combined.split_at(SALT_SIZE);

        let mut hash = [0u8; HASH_SIZE];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut hash);
        constant_time_eq(&hash, stored_hash)
    }
}

/// Salt bytes are the UTF-8 label, zero-padded or truncated to 16 bytes.
fn fixed_salt(label: &str) -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    let bytes = label.as_bytes();
    let n = bytes.len().min(SALT_SIZE);
    salt[..n].copy_from_slice(&bytes[..n]);
    salt
}

/// XOR-accumulating comparison. A length mismatch returns early; equal-length
/// inputs always walk the full slice.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = PasswordHasher::default();
        assert_eq!(hasher.hash("hunter2"), hasher.hash("hunter2"));
        assert_eq!(hasher.hash(""), hasher.hash(""));
    }

    #[test]
    fn test_verify_round_trip() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("correct horse battery staple");
        assert!(hasher.verify("correct horse battery staple", &digest));
        assert!(!hasher.verify("correct horse battery stable", &digest));
    }

    #[test]
    fn test_empty_password_round_trip() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("");
        assert!(hasher.verify("", &digest));
        assert!(!hasher.verify("x", &digest));
    }

    #[test]
    fn test_different_passwords_differ() {
        let hasher = PasswordHasher::default();
        assert_ne!(hasher.hash("alpha"), hasher.hash("beta"));
    }

    #[test]
    fn test_equal_length_mismatch_is_false() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("alpha");
        // Same length as a real digest, different content.
        let mut forged = digest.clone().into_bytes();
        forged[0] = if forged[0] == b'A' { b'B' } else { b'A' };
        let forged = String::from_utf8(forged).unwrap();
        assert_eq!(forged.len(), digest.len());
        assert!(!hasher.verify("alpha", &forged));
    }

    #[test]
    fn test_unequal_length_mismatch_is_false() {
        let hasher = PasswordHasher::default();
        assert!(!hasher.verify("alpha", "short"));
        assert!(!hasher.verify("alpha", ""));
    }

    #[test]
    fn test_random_scheme_digests_differ_but_verify() {
        let hasher = PasswordHasher::new(DigestScheme::RandomSalt);
        let d1 = hasher.hash("hunter2");
        let d2 = hasher.hash("hunter2");
        assert_ne!(d1, d2);
        assert!(d1.starts_with(V2_PREFIX));
        assert!(hasher.verify("hunter2", &d1));
        assert!(hasher.verify("hunter2", &d2));
        assert!(!hasher.verify("hunter3", &d1));
    }

    #[test]
    fn test_legacy_digest_verifies_under_random_scheme() {
        let legacy = PasswordHasher::new(DigestScheme::FixedSalt);
        let digest = legacy.hash("hunter2");

        let hasher = PasswordHasher::new(DigestScheme::RandomSalt);
        assert!(hasher.verify("hunter2", &digest));
        assert!(!hasher.verify("hunter3", &digest));
    }

    #[test]
    fn test_malformed_v2_digest_is_false() {
        let hasher = PasswordHasher::default();
        assert!(!hasher.verify("x", "v2$not-base64!!"));
        assert!(!hasher.verify("x", "v2$AAAA"));
    }
}
