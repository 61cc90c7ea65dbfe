//! Startup configuration loaded via OrthoConfig.
//!
//! [`ServerSettings`] reads `SITE_*` variables and [`AdminSeedSettings`]
//! reads `ADMIN_*` variables. Both also accept the matching command-line
//! flags, which take precedence over the environment.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{AdminAccount, UserValidationError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_FULL_NAME: &str = "Administrator";

/// HTTP listener and database settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SITE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// PostgreSQL connection string. Without it the server keeps users and
    /// sessions in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections; zero keeps the default.
    #[ortho_config(default = DEFAULT_DB_MAX_CONNECTIONS)]
    pub db_max_connections: u32,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The configured admin account is invalid.
    #[error("invalid admin seed account: {0}")]
    AdminAccount(#[from] UserValidationError),
}

impl ServerSettings {
    /// Socket address to listen on, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.trim();
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, if one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, defaulting to 10 connections.
    pub fn db_max_connections(&self) -> u32 {
        if self.db_max_connections == 0 {
            DEFAULT_DB_MAX_CONNECTIONS
        } else {
            self.db_max_connections
        }
    }
}

/// Administrator account created at startup when missing.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN")]
pub struct AdminSeedSettings {
    /// Login name of the admin account.
    #[ortho_config(default = DEFAULT_ADMIN_USERNAME.to_owned())]
    pub username: String,
    /// Plaintext password; seeding is disabled while this is unset.
    pub password: Option<String>,
    /// Display name of the admin account.
    #[ortho_config(default = DEFAULT_ADMIN_FULL_NAME.to_owned())]
    pub full_name: String,
    /// Optional biography.
    pub bio: Option<String>,
}

impl std::fmt::Debug for AdminSeedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeedSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("full_name", &self.full_name)
            .field("bio", &self.bio)
            .finish()
    }
}

impl AdminSeedSettings {
    /// The account to seed, or `None` when no password is configured.
    ///
    /// # Errors
    /// Returns [`SettingsError::AdminAccount`] when the username or full name
    /// is invalid.
    pub fn account(&self) -> Result<Option<AdminAccount>, SettingsError> {
        let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        let account = AdminAccount::try_new(
            &self.username,
            Zeroizing::new(password.to_owned()),
            &self.full_name,
            self.bio.clone(),
        )?;
        Ok(Some(account))
    }
}
