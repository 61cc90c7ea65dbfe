//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When the
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// User accounts.
    ///
    /// `username` carries the `users_username_key` unique constraint that
    /// arbitrates concurrent registrations.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique, case-sensitive login name.
        username -> Varchar,
        /// `hex(key).hex(salt)` scrypt hash.
        password_hash -> Text,
        /// `admin` or `user`.
        role -> Varchar,
        /// Display name.
        full_name -> Varchar,
        /// Optional biography.
        bio -> Nullable<Text>,
        /// Optional profile photo reference.
        profile_photo -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Server-side sessions keyed by the SHA-256 digest of the cookie token.
    sessions (token_digest) {
        /// Hex-encoded token digest.
        token_digest -> Varchar,
        /// Owning user; sessions are removed with the user.
        user_id -> Uuid,
        /// Absolute expiry.
        expires_at -> Timestamptz,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(sessions -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, sessions);
