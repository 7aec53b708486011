//! Salted password digests.
//!
//! A digest is stored as `<hash hex>.<salt hex>`, where the hash is the
//! PBKDF2-HMAC-SHA256 output of the password and salt.
//!
//! # Invariants
//! - Every call to [`PasswordHasher::hash`] uses a fresh random salt, so two
//!   digests of the same password differ.
//! - [`PasswordHasher::verify`] never fails loudly: malformed digests simply
//!   do not verify.
//! - A digest only verifies under the iteration count it was created with.

use rand::RngCore;
use sha2::Sha256;

/// Length of the random salt in bytes (hex-encoded to twice this).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (hex-encoded to twice this).
pub const HASH_LEN: usize = 64;

/// Separator between hash and salt in a stored digest.
pub const DIGEST_SEPARATOR: char = '.';

/// Salt used when deriving a throwaway hash for unknown users.
const DUMMY_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

/// Error returned when a digest or the hasher parameters are unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The stored digest does not have the `<hash>.<salt>` shape.
    MalformedDigest,
    /// The iteration count is zero.
    InvalidParameters,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedDigest => write!(f, "malformed password digest"),
            Self::InvalidParameters => write!(f, "iteration count must be non-zero"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// A stored digest split into its decoded parts.
struct ParsedDigest {
    hash: Vec<u8>,
    salt: Vec<u8>,
}

impl ParsedDigest {
    /// Split and hex-decode a `<hash>.<salt>` digest.
    ///
    /// # Errors
    /// Returns `PasswordError::MalformedDigest` if either half is missing,
    /// not valid hex, or of the wrong length.
    fn parse(digest: &str) -> Result<Self, PasswordError> {
        let (hash_hex, salt_hex) = digest
            .split_once(DIGEST_SEPARATOR)
            .ok_or(PasswordError::MalformedDigest)?;
        let hash = hex::decode(hash_hex).map_err(|_| PasswordError::MalformedDigest)?;
        let salt = hex::decode(salt_hex).map_err(|_| PasswordError::MalformedDigest)?;
        if hash.len() != HASH_LEN || salt.len() != SALT_LEN {
            return Err(PasswordError::MalformedDigest);
        }
        Ok(Self { hash, salt })
    }
}

/// Derives and verifies salted password digests.
///
/// The hasher is cheap to copy; the only state is the iteration count.
/// Both operations are CPU-bound and should run off the async executor
/// (see `tokio::task::spawn_blocking`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given PBKDF2 iteration count.
    ///
    /// # Errors
    /// Returns `PasswordError::InvalidParameters` if `iterations` is zero.
    pub const fn new(iterations: u32) -> Result<Self, PasswordError> {
        if iterations == 0 {
            return Err(PasswordError::InvalidParameters);
        }
        Ok(Self { iterations })
    }

    /// The configured iteration count.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a freshly generated salt.
    ///
    /// # Post-conditions
    /// - `self.verify(password, &result)` is `true`.
    #[must_use]
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let hash = self.derive(password, &salt);
        format!("{}{DIGEST_SEPARATOR}{}", hex::encode(hash), hex::encode(salt))
    }

    /// Check a password against a stored digest.
    ///
    /// Returns `false` for a wrong password and for a malformed digest.
    #[must_use]
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed = match ParsedDigest::parse(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("refusing to verify against stored digest: {e}");
                self.burn(password);
                return false;
            }
        };
        let derived = self.derive(password, &parsed.salt);
        constant_time_eq(&derived, &parsed.hash)
    }

    /// Spend the same work as a real verification and discard the result.
    ///
    /// Used when the username is unknown or the stored digest is malformed,
    /// so every failure path takes comparable time.
    pub fn burn(&self, password: &str) {
        let _ = self.derive(password, &DUMMY_SALT);
    }

    fn derive(&self, password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
        #[cfg(test)]
        DERIVATIONS.with(|count| count.set(count.get() + 1));
        let mut key = [0u8; HASH_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key);
        key
    }
}

#[cfg(test)]
thread_local! {
    /// Key derivations performed on this thread.
    static DERIVATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Compare two byte strings without short-circuiting on the first mismatch.
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
