//! Server-side session primitives.
//!
//! Clients hold an opaque [`SessionToken`]; the store only ever sees its
//! SHA-256 [`TokenDigest`]. Sessions have a fixed absolute lifetime of
//! [`SESSION_TTL_DAYS`] days and are never extended.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::UserId;

/// Absolute session lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 30;

const TOKEN_BYTES: usize = 32;

/// Fixed session lifetime as a [`Duration`].
#[must_use]
pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// Opaque bearer token carried in the session cookie.
///
/// ## Invariants
/// - Exactly 64 lowercase hexadecimal characters (32 random bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Parse a token presented by a client.
    ///
    /// Returns `None` for values that could never have been issued, so the
    /// store is not consulted for garbage cookies.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::SessionToken;
    ///
    /// let token = SessionToken::generate();
    /// assert_eq!(SessionToken::parse(token.as_str()), Some(token));
    /// assert!(SessionToken::parse("not-a-token").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == TOKEN_BYTES * 2
            && raw
                .bytes()
                .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte));
        well_formed.then(|| Self(Zeroizing::new(raw.to_owned())))
    }

    /// Cookie representation of the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Digest under which the session is stored.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of a [`SessionToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap a digest read back from storage.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted session state keyed by [`TokenDigest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    digest: TokenDigest,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a session record.
    #[must_use]
    pub fn new(digest: TokenDigest, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            digest,
            user_id,
            expires_at,
        }
    }

    /// Storage key.
    #[must_use]
    pub fn digest(&self) -> &TokenDigest {
        &self.digest
    }

    /// Owner of the session.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Absolute expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session has expired at `now`. Expiry is inclusive.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
