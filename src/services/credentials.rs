use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;

use crate::error::{AppError, Result};

type HmacSha512 = Hmac<Sha512>;

/// Salt length; one full SHA-512 block, the size of a freshly generated HMAC key.
pub const SALT_LEN: usize = 128;

/// HMAC-SHA512 password digest keyed by a random salt, stored as raw bytes on
/// the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

impl PasswordCredentials {
    /// Hash `password` under a fresh random salt.
    pub fn new(password: &str) -> Result<Self> {
        let mut salt = vec![0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = digest(&salt, password)
            .ok_or_else(|| AppError::Internal("invalid password salt".to_string()))?;
        Ok(Self { hash, salt })
    }

    pub fn verify(&self, password: &str) -> bool {
        verify_password(password, &self.hash, &self.salt)
    }
}

/// Constant-time check of `password` against a stored hash and salt.
pub fn verify_password(password: &str, hash: &[u8], salt: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha512::new_from_slice(salt) else {
        return false;
    };
    mac.update(password.as_bytes());
    mac.verify_slice(hash).is_ok()
}

fn digest(salt: &[u8], password: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha512::new_from_slice(salt).ok()?;
    mac.update(password.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}
