//! Credential materialization for the rendered user account
//!
//! # Password hashes
//!
//! Passwords are turned into SHA-512 crypt(3) strings
//! (`$6$rounds=4096$<salt>$<hash>`), the format cloud-init hands straight to
//! `chpasswd -e`. The scheme id and round count are part of the output, so a
//! hash can be verified later without knowing how it was produced.
//!
//! The salt normally comes from the thread RNG. A fixed salt can be injected
//! with [`SecretMaterializer::with_salt`] to make output reproducible.
//!
//! # Public keys
//!
//! [`SecretMaterializer::read_public_key`] expands a leading `~/`, reads the
//! file, and strips trailing newlines so the key renders as one YAML scalar.

use crate::error::{ProvisionError, Result};
use rand::Rng;
use sha_crypt::{Sha512Params, sha512_crypt_b64};
use std::fs;
use std::path::{Path, PathBuf};

/// Round count baked into every hash.
pub const HASH_ROUNDS: usize = 4096;

/// Salt length in characters (the SHA-crypt maximum).
pub const SALT_LEN: usize = 16;

const SALT_ALPHABET: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Where salts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SaltSource {
    Random,
    Fixed(String),
}

/// Produces password hashes and SSH key material for the renderer.
#[derive(Debug, Clone)]
pub struct SecretMaterializer {
    salt: SaltSource,
}

impl Default for SecretMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretMaterializer {
    /// Materializer with a fresh random salt per hash
    pub fn new() -> Self {
        Self {
            salt: SaltSource::Random,
        }
    }

    /// Materializer that always uses `salt`.
    ///
    /// Characters outside the crypt alphabet are dropped and the result is
    /// cut to [`SALT_LEN`]. If nothing usable is left, salts are random.
    pub fn with_salt(salt: &str) -> Self {
        let cleaned: String = salt
            .bytes()
            .filter(|b| SALT_ALPHABET.contains(b))
            .take(SALT_LEN)
            .map(char::from)
            .collect();
        if cleaned.is_empty() {
            tracing::warn!("Fixed salt has no crypt characters, using random salts");
            return Self::new();
        }
        Self {
            salt: SaltSource::Fixed(cleaned),
        }
    }

    fn salt(&self) -> String {
        match &self.salt {
            SaltSource::Fixed(s) => s.clone(),
            SaltSource::Random => {
                let mut rng = rand::thread_rng();
                (0..SALT_LEN)
                    .map(|_| char::from(SALT_ALPHABET[rng.gen_range(0..SALT_ALPHABET.len())]))
                    .collect()
            }
        }
    }

    /// Hash `plaintext` into a self-describing `$6$rounds=4096$...` string.
    pub fn hash_password(&self, plaintext: &str) -> Result<String> {
        let params = Sha512Params::new(HASH_ROUNDS)
            .map_err(|e| ProvisionError::PasswordHash(format!("{e:?}")))?;
        let salt = self.salt();
        let hash = sha512_crypt_b64(plaintext.as_bytes(), salt.as_bytes(), &params)
            .map_err(|e| ProvisionError::PasswordHash(format!("{e:?}")))?;
        Ok(format!("$6$rounds={HASH_ROUNDS}${salt}${hash}"))
    }

    /// Read an SSH public key, expanding `~/` and trimming trailing newlines.
    pub fn read_public_key(&self, path: &str) -> Result<String> {
        let resolved = expand_home(path.trim());
        let contents =
            fs::read_to_string(&resolved).map_err(|source| ProvisionError::KeyUnreadable {
                path: resolved.clone(),
                source,
            })?;
        let key = contents.trim_end_matches(['\n', '\r']);
        tracing::debug!(path = %resolved.display(), "Read SSH public key");
        Ok(key.to_string())
    }
}

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Paths without the shorthand, and paths when no home directory can be
/// determined, are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(path).to_path_buf(),
    }
}
