//! Salted scrypt password hashing.
//!
//! Stored hashes use the format `hex(derived_key) + "." + hex(salt)` with a
//! 64-byte derived key and a 16-byte random salt. The scrypt salt input is
//! the ASCII hex text of the salt, not its raw bytes, so hashes written by
//! the previous Node.js backend verify unchanged. Derivation is CPU bound,
//! so the async helpers move it onto the blocking pool and carry the current
//! [`TraceId`] with it.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::Params;
use subtle::ConstantTimeEq;
use tracing::error;
use zeroize::Zeroizing;

use super::{Error, TraceId};

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 64;
/// Length of the random salt in bytes.
pub const SALT_LEN: usize = 16;

const LOG_N: u8 = 14;
const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const SEPARATOR: char = '.';

/// Encoded password hash as persisted in the credential store.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage. The value is not validated;
    /// malformed hashes simply never verify.
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded representation for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Errors raised while configuring or running the key derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// The scrypt cost parameters were rejected.
    #[error("invalid scrypt parameters: {message}")]
    InvalidParams { message: String },
    /// Key derivation failed.
    #[error("scrypt derivation failed: {message}")]
    Derivation { message: String },
}

/// scrypt hasher with fixed cost parameters.
///
/// # Examples
/// ```
/// use site_backend::domain::PasswordHasher;
///
/// let hasher = PasswordHasher::new().expect("standard parameters are valid");
/// let hash = hasher.hash("secret1").expect("hashing succeeds");
/// assert!(hasher.verify("secret1", &hash));
/// assert!(!hasher.verify("secret2", &hash));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher using `N = 2^14, r = 8, p = 1` and a 64-byte key.
    ///
    /// # Errors
    /// Returns [`PasswordHashError::InvalidParams`] if the scrypt crate rejects
    /// the parameters.
    pub fn new() -> Result<Self, PasswordHashError> {
        Self::with_cost(LOG_N, BLOCK_SIZE, PARALLELISM)
    }

    /// Hasher with reduced cost for tests. Hashes it produces are not
    /// interchangeable with the standard hasher.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fast() -> Result<Self, PasswordHashError> {
        Self::with_cost(4, BLOCK_SIZE, PARALLELISM)
    }

    fn with_cost(log_n: u8, r: u32, p: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(log_n, r, p, KEY_LEN).map_err(|err| {
            PasswordHashError::InvalidParams {
                message: err.to_string(),
            }
        })?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// Returns [`PasswordHashError::Derivation`] if scrypt rejects the output
    /// buffer.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);
        let key = self.derive(password, salt_hex.as_bytes())?;
        Ok(PasswordHash(format!(
            "{}{SEPARATOR}{salt_hex}",
            hex::encode(key.as_slice())
        )))
    }

    /// Check a password against a stored hash in constant time.
    ///
    /// Malformed hashes (missing separator, non-hex halves, wrong key length)
    /// return `false`.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        let Some((key_hex, salt_hex)) = stored.as_str().split_once(SEPARATOR) else {
            return false;
        };
        let (Ok(expected), Ok(salt)) = (hex::decode(key_hex), hex::decode(salt_hex)) else {
            return false;
        };
        if expected.len() != KEY_LEN || salt.is_empty() {
            return false;
        }
        match self.derive(password, salt_hex.as_bytes()) {
            Ok(derived) => derived.as_slice().ct_eq(expected.as_slice()).into(),
            Err(err) => {
                error!(error = %err, "password verification failed to derive key");
                false
            }
        }
    }

    /// Run a derivation whose result is discarded so that lookups for absent
    /// accounts cost the same as a failed verification.
    pub fn burn(&self, password: &str) {
        let salt = [b'0'; SALT_LEN * 2];
        if let Err(err) = self.derive(password, &salt) {
            error!(error = %err, "dummy password derivation failed");
        }
    }

    fn derive(
        &self,
        password: &str,
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, PasswordHashError> {
        let mut key = Zeroizing::new([0_u8; KEY_LEN]);
        scrypt::scrypt(password.as_bytes(), salt, &self.params, key.as_mut_slice()).map_err(
            |err| PasswordHashError::Derivation {
                message: err.to_string(),
            },
        )?;
        Ok(key)
    }

    /// [`Self::hash`] on the blocking pool.
    ///
    /// # Errors
    /// Returns an internal [`Error`] if derivation fails or the blocking task
    /// is cancelled.
    pub async fn hash_blocking(
        self,
        password: Zeroizing<String>,
    ) -> Result<PasswordHash, Error> {
        let trace_id = TraceId::current();
        let outcome = tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || self.hash(password.as_str()))
        })
        .await
        .map_err(|err| {
            error!(error = %err, "password hashing task failed");
            Error::internal("password hashing failed")
        })?;
        outcome.map_err(|err| {
            error!(error = %err, "password hashing failed");
            Error::internal("password hashing failed")
        })
    }

    /// [`Self::verify`] on the blocking pool.
    ///
    /// # Errors
    /// Returns an internal [`Error`] if the blocking task is cancelled.
    pub async fn verify_blocking(
        self,
        password: Zeroizing<String>,
        stored: PasswordHash,
    ) -> Result<bool, Error> {
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || self.verify(password.as_str(), &stored))
        })
        .await
        .map_err(|err| {
            error!(error = %err, "password verification task failed");
            Error::internal("password verification failed")
        })
    }

    /// [`Self::burn`] on the blocking pool.
    ///
    /// # Errors
    /// Returns an internal [`Error`] if the blocking task is cancelled.
    pub async fn burn_blocking(self, password: Zeroizing<String>) -> Result<(), Error> {
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || self.burn(password.as_str()));
        })
        .await
        .map_err(|err| {
            error!(error = %err, "dummy password derivation task failed");
            Error::internal("password verification failed")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> PasswordHasher {
        PasswordHasher::fast().expect("fast parameters are valid")
    }

    #[rstest]
    fn standard_parameters_are_accepted() {
        assert!(PasswordHasher::new().is_ok());
    }

    /// Produced by Node.js `scryptSync("devansh123", salt, 64)` with the hex
    /// salt string as input.
    const NODE_ADMIN_HASH: &str = "3cce0e3445c9782564e20a4047a33646cf210301fb54f375c97f421bfc5cbc6a0a230e8cd0b8b09cce27e2c676d88fbabf59e83ca3f1feb61b384b9fdaf798b5.3057bf9f0b567e10969af1a1bf845e50";

    #[rstest]
    fn verifies_hashes_written_by_node_backend() {
        let hasher = PasswordHasher::new().expect("standard parameters are valid");
        let stored = PasswordHash::from_stored(NODE_ADMIN_HASH);
        assert!(hasher.verify("devansh123", &stored));
        assert!(!hasher.verify("devansh124", &stored));
    }

    #[rstest]
    fn hash_derives_from_hex_salt_text() {
        let hasher = PasswordHasher::new().expect("standard parameters are valid");
        let hash = hasher.hash("devansh123").expect("hash");
        let (key_hex, salt_hex) = hash.as_str().split_once('.').expect("separator");
        let expected = hasher
            .derive("devansh123", salt_hex.as_bytes())
            .expect("derive");
        assert_eq!(key_hex, hex::encode(expected.as_slice()));
    }

    #[rstest]
    fn hash_has_key_and_salt_halves(hasher: PasswordHasher) {
        let hash = hasher.hash("secret1").expect("hash");
        let (key, salt) = hash.as_str().split_once('.').expect("separator");
        assert_eq!(key.len(), KEY_LEN * 2);
        assert_eq!(salt.len(), SALT_LEN * 2);
    }

    #[rstest]
    fn verify_accepts_matching_password(hasher: PasswordHasher) {
        let hash = hasher.hash("secret1").expect("hash");
        assert!(hasher.verify("secret1", &hash));
    }

    #[rstest]
    fn verify_rejects_other_password(hasher: PasswordHasher) {
        let hash = hasher.hash("secret2").expect("hash");
        assert!(!hasher.verify("secret1", &hash));
    }

    #[rstest]
    fn hashing_twice_differs_and_both_verify(hasher: PasswordHasher) {
        let first = hasher.hash("same password").expect("hash");
        let second = hasher.hash("same password").expect("hash");
        assert_ne!(first, second);
        assert!(hasher.verify("same password", &first));
        assert!(hasher.verify("same password", &second));
    }

    #[rstest]
    fn empty_password_still_hashes(hasher: PasswordHasher) {
        let hash = hasher.hash("").expect("hash");
        assert!(hasher.verify("", &hash));
        assert!(!hasher.verify(" ", &hash));
    }

    #[rstest]
    #[case::no_separator("abcdef")]
    #[case::non_hex_key("zz.00112233445566778899aabbccddeeff")]
    #[case::non_hex_salt("00.not-hex")]
    #[case::short_key("0011.00112233445566778899aabbccddeeff")]
    #[case::empty("")]
    fn verify_rejects_malformed_hashes(hasher: PasswordHasher, #[case] stored: &str) {
        assert!(!hasher.verify("secret1", &PasswordHash::from_stored(stored)));
    }

    #[rstest]
    fn verify_rejects_empty_salt_half(hasher: PasswordHasher) {
        let hash = hasher.hash("secret1").expect("hash");
        let (key, _) = hash.as_str().split_once('.').expect("separator");
        let truncated = PasswordHash::from_stored(format!("{key}."));
        assert!(!hasher.verify("secret1", &truncated));
    }

    #[rstest]
    fn debug_output_is_redacted(hasher: PasswordHasher) {
        let hash = hasher.hash("secret1").expect("hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip() {
        let hasher = PasswordHasher::fast().expect("fast parameters are valid");
        let hash = hasher
            .hash_blocking(Zeroizing::new("secret1".to_owned()))
            .await
            .expect("hash");
        let verified = hasher
            .verify_blocking(Zeroizing::new("secret1".to_owned()), hash)
            .await
            .expect("verify");
        assert!(verified);
        hasher
            .burn_blocking(Zeroizing::new("secret1".to_owned()))
            .await
            .expect("burn");
    }
}
