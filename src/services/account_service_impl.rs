//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

use crate::constants::{metric, roles};
use crate::db::{NewUserRow, Store, UserRepository};
use crate::models::user::{NewAccount, Principal, ProfileUpdate, User};
use crate::services::account_service::{
    AccountError, AccountPolicy, AccountService, check_reset_eligibility,
};
use crate::services::password::CredentialHasher;
use crate::services::tokens;

pub struct SeaOrmAccountService {
    store: Store,
    hasher: Arc<dyn CredentialHasher>,
    policy: AccountPolicy,
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Store, hasher: Arc<dyn CredentialHasher>, policy: AccountPolicy) -> Self {
        Self {
            store,
            hasher,
            policy,
        }
    }

    /// Argon2 is CPU-bound, so it runs off the async runtime.
    async fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(AccountError::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                AccountError::Internal(format!("Password verification task failed: {e}"))
            })?
            .map_err(AccountError::from)
    }

    async fn resolve(&self, principal: &Principal) -> Result<User, AccountError> {
        self.store
            .user_repo()
            .find_by_login(principal.login())
            .await?
            .ok_or(AccountError::Unauthorized)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn activate_registration(&self, key: &str) -> Result<Option<User>, AccountError> {
        if key.is_empty() {
            return Ok(None);
        }

        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let Some(mut user) = repo.find_by_activation_key(key).await? else {
            debug!("No account matches the given activation key");
            return Ok(None);
        };

        user.activated = true;
        user.activation_key = None;
        let user = repo.save(&user).await?;
        txn.commit().await?;

        metrics::counter!(metric::ACCOUNT_ACTIVATIONS).increment(1);
        info!(event = "account_activated", login = %user.login, "Activated user");
        Ok(Some(user))
    }

    async fn request_password_reset(&self, email: &str) -> Result<Option<User>, AccountError> {
        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let mut user = match repo.find_by_email(email).await? {
            Some(user) if user.activated => user,
            _ => {
                debug!("Password reset refused: unknown or unactivated email");
                return Ok(None);
            }
        };

        user.reset_key = Some(tokens::generate_reset_key());
        user.reset_date = Some(Utc::now());
        let user = repo.save(&user).await?;
        txn.commit().await?;

        metrics::counter!(metric::PASSWORD_RESETS_REQUESTED).increment(1);
        info!(event = "password_reset_requested", login = %user.login, "Issued reset key");
        Ok(Some(user))
    }

    async fn complete_password_reset(
        &self,
        new_password: &str,
        key: &str,
    ) -> Result<Option<User>, AccountError> {
        if key.is_empty() {
            return Ok(None);
        }

        let password_hash = self.hash_password(new_password).await?;

        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let Some(mut user) = repo.find_by_reset_key(key).await? else {
            debug!(reason = %AccountError::NotFound, "Password reset not completed");
            return Ok(None);
        };

        if let Err(reason) =
            check_reset_eligibility(&user, Utc::now(), self.policy.reset_key_validity)
        {
            debug!(login = %user.login, reason = %reason, "Password reset not completed");
            return Ok(None);
        }

        user.password_hash = password_hash;
        user.reset_key = None;
        user.reset_date = None;
        let user = repo.save(&user).await?;
        txn.commit().await?;

        metrics::counter!(metric::PASSWORD_RESETS_COMPLETED).increment(1);
        info!(event = "password_reset_completed", login = %user.login, "Password reset");
        Ok(Some(user))
    }

    async fn create_user_information(&self, account: NewAccount) -> Result<User, AccountError> {
        let password_hash = self.hash_password(&account.password).await?;

        let row = NewUserRow {
            login: account.login,
            password_hash,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            lang_key: account.lang_key,
            activation_key: Some(tokens::generate_activation_key()),
            authorities: BTreeSet::from([roles::USER.to_string()]),
        };

        let txn = self.store.begin().await?;
        let user = UserRepository::new(&txn).insert(row).await?;
        txn.commit().await?;

        metrics::counter!(metric::ACCOUNT_REGISTRATIONS).increment(1);
        info!(event = "account_created", login = %user.login, "Created information for user");
        Ok(user)
    }

    async fn update_user_information(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, AccountError> {
        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let mut user = repo
            .find_by_login(principal.login())
            .await?
            .ok_or(AccountError::Unauthorized)?;

        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        user.lang_key = update.lang_key;
        let user = repo.save(&user).await?;
        txn.commit().await?;

        debug!(login = %user.login, "Changed information for user");
        Ok(user)
    }

    async fn change_password(
        &self,
        principal: &Principal,
        new_password: &str,
    ) -> Result<User, AccountError> {
        let password_hash = self.hash_password(new_password).await?;

        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let mut user = repo
            .find_by_login(principal.login())
            .await?
            .ok_or(AccountError::Unauthorized)?;

        user.password_hash = password_hash;
        let user = repo.save(&user).await?;
        txn.commit().await?;

        info!(event = "password_changed", login = %user.login, "Changed password for user");
        Ok(user)
    }

    async fn get_user_with_authorities(
        &self,
        principal: &Principal,
    ) -> Result<User, AccountError> {
        self.resolve(principal).await
    }

    async fn remove_not_activated_users(&self) -> Result<u64, AccountError> {
        let cutoff = Utc::now() - self.policy.unactivated_retention;

        let txn = self.store.begin().await?;
        let repo = UserRepository::new(&txn);

        let mut removed = 0u64;
        for user in repo.find_all_unactivated_created_before(cutoff).await? {
            debug!(login = %user.login, "Deleting not activated user");
            if repo.delete(&user).await? {
                removed += 1;
            }
        }
        txn.commit().await?;

        if removed > 0 {
            metrics::counter!(metric::ACCOUNTS_PURGED).increment(removed);
            info!(event = "accounts_purged", count = removed, "Removed not activated users");
        }
        Ok(removed)
    }

    async fn authenticate(&self, login: &str, password: &str) -> Result<User, AccountError> {
        let user = self
            .store
            .user_repo()
            .find_by_login(login)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AccountError::InvalidCredentials);
        }

        if !user.activated {
            return Err(AccountError::NotEligible);
        }

        Ok(user)
    }
}
