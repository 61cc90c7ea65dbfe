//! Startup seeding of the administrator account.
//!
//! Accounts are only ever created here; an existing user with the configured
//! username is left untouched, whatever its role or password.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Error, FullName, PasswordHasher, Role, User, UserId, UserValidationError, Username,
};

/// Administrator account requested by configuration.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    username: Username,
    password: Zeroizing<String>,
    full_name: FullName,
    bio: Option<String>,
}

impl AdminAccount {
    /// Validate the configured account fields.
    ///
    /// # Errors
    /// Returns the first field that fails validation.
    pub fn try_new(
        username: &str,
        password: Zeroizing<String>,
        full_name: &str,
        bio: Option<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password,
            full_name: FullName::new(full_name)?,
            bio,
        })
    }

    /// Configured login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// Result of [`AdminBootstrap::ensure_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeedOutcome {
    /// A new admin account was created.
    Created,
    /// An account with the configured username already existed.
    AlreadyPresent,
}

/// Creates the configured administrator when it is missing.
pub struct AdminBootstrap<U: ?Sized> {
    users: Arc<U>,
    hasher: PasswordHasher,
}

impl<U> AdminBootstrap<U>
where
    U: UserRepository + ?Sized,
{
    /// Create a bootstrapper writing through `users`.
    pub fn new(users: Arc<U>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Ensure the administrator account exists.
    ///
    /// # Errors
    /// Propagates store and hashing failures.
    pub async fn ensure_admin(&self, account: AdminAccount) -> Result<AdminSeedOutcome, Error> {
        let existing = self
            .users
            .find_by_username(&account.username)
            .await
            .map_err(map_seed_error)?;
        if let Some(user) = existing {
            if user.role() != Role::Admin {
                warn!(
                    username = %account.username,
                    "configured admin username belongs to a non-admin account"
                );
            }
            return Ok(AdminSeedOutcome::AlreadyPresent);
        }

        let AdminAccount {
            username,
            password,
            full_name,
            bio,
        } = account;
        let password_hash = self.hasher.hash_blocking(password).await?;
        let admin = User::new(UserId::random(), username, password_hash, Role::Admin, full_name)
            .with_bio(bio);

        match self.users.insert(&admin).await {
            Ok(()) => {
                info!(user_id = %admin.id(), username = %admin.username(), "admin account created");
                Ok(AdminSeedOutcome::Created)
            }
            Err(UserPersistenceError::DuplicateUsername { .. }) => {
                Ok(AdminSeedOutcome::AlreadyPresent)
            }
            Err(err) => Err(map_seed_error(err)),
        }
    }
}

fn map_seed_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username already exists: {username}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::test_support::TestStores;

    fn account(username: &str, password: &str) -> AdminAccount {
        AdminAccount::try_new(
            username,
            Zeroizing::new(password.to_owned()),
            "Devansh",
            Some("Site owner".to_owned()),
        )
        .expect("valid admin account")
    }

    #[tokio::test]
    async fn creates_missing_admin() {
        let stores = TestStores::new();
        let bootstrap = AdminBootstrap::new(stores.users.clone(), stores.hasher);

        let outcome = bootstrap
            .ensure_admin(account("devansh", "devansh123"))
            .await
            .expect("seed");
        assert_eq!(outcome, AdminSeedOutcome::Created);

        let admin = stores
            .users
            .find_by_username(&Username::new("devansh").expect("username"))
            .await
            .expect("lookup")
            .expect("admin stored");
        assert_eq!(admin.role(), Role::Admin);
        assert_eq!(admin.bio(), Some("Site owner"));
        assert!(stores.hasher.verify("devansh123", admin.password_hash()));
    }

    #[tokio::test]
    async fn leaves_existing_account_untouched() {
        let stores = TestStores::new();
        let existing = stores
            .seed_user("devansh", "original1", "Devansh", Role::User)
            .await;
        let bootstrap = AdminBootstrap::new(stores.users.clone(), stores.hasher);

        let outcome = bootstrap
            .ensure_admin(account("devansh", "devansh123"))
            .await
            .expect("seed");
        assert_eq!(outcome, AdminSeedOutcome::AlreadyPresent);

        let stored = stores
            .users
            .find_by_id(existing.id())
            .await
            .expect("lookup")
            .expect("user kept");
        assert_eq!(stored, existing);
    }

    #[tokio::test]
    async fn concurrent_creation_counts_as_present() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().return_once(|_| Ok(None));
        users
            .expect_insert()
            .return_once(|_| Err(UserPersistenceError::duplicate_username("devansh")));
        let bootstrap = AdminBootstrap::new(
            Arc::new(users),
            PasswordHasher::fast().expect("fast parameters"),
        );

        let outcome = bootstrap
            .ensure_admin(account("devansh", "devansh123"))
            .await
            .expect("seed");
        assert_eq!(outcome, AdminSeedOutcome::AlreadyPresent);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let result = AdminAccount::try_new("ad", Zeroizing::new("pw".to_owned()), "Admin", None);
        assert!(matches!(
            result,
            Err(UserValidationError::UsernameTooShort { .. })
        ));
    }
}
