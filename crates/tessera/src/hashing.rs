//! Salted digests for captcha answers and similar throwaway tokens.
//!
//! Not for credentials: the digest is a plain, unstretched SHA-1.

use std::borrow::Cow;

use mosaic_common::constants::{RANDOM_SALT_LEN, SALT_LEN};
use rand::Rng;
use sha1::{Digest, Sha1};

/// Hex `SHA-1(salt ++ input)`, 40 characters. A missing or empty salt is
/// replaced by a random one, so the result is then unrepeatable.
pub fn generate_hash(input: &str, salt: Option<&str>) -> String {
    let salt = match salt {
        Some(salt) if !salt.is_empty() => Cow::Borrowed(salt),
        _ => Cow::Owned(random_salt()),
    };
    digest(&salt, input)
}

/// 25 hex chars derived from a random number
pub fn random_salt() -> String {
    let seed: u64 = rand::rng().random();
    let mut salt = hex::encode(Sha1::digest(seed.to_string().as_bytes()));
    salt.truncate(RANDOM_SALT_LEN);
    salt
}

fn digest(salt: &str, input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(salt.as_bytes());
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hasher bound to a process-wide salt taken from configuration
#[derive(Clone)]
pub struct SaltedHasher {
    salt: String,
}

impl SaltedHasher {
    /// Use the first 20 characters of `secret` as the salt
    pub fn from_secret(secret: &str) -> Self {
        let salt: String = secret.chars().take(SALT_LEN).collect();
        if salt.is_empty() {
            tracing::warn!("No secret key configured, hashes will not survive a restart");
            return Self { salt: random_salt() };
        }
        Self { salt }
    }

    pub fn hash(&self, input: &str) -> String {
        generate_hash(input, Some(&self.salt))
    }

    /// True if `input` hashes to `expected`
    pub fn verify(&self, input: &str, expected: &str) -> bool {
        self.hash(input).eq_ignore_ascii_case(expected.trim())
    }
}

impl std::fmt::Debug for SaltedHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltedHasher").finish_non_exhaustive()
    }
}
