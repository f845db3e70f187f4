//! Domain service for the user account lifecycle.
//!
//! Covers registration, activation, profile and password changes, password
//! reset, and the periodic purge of accounts that were never activated.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::models::user::{NewAccount, Principal, ProfileUpdate, User};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("No matching account")]
    NotFound,

    #[error("Account is not eligible for this operation")]
    NotEligible,

    #[error("Reset key has expired")]
    Expired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for AccountError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                let message = if detail.contains("login") {
                    "Login already in use".to_string()
                } else if detail.contains("email") {
                    "Email already in use".to_string()
                } else {
                    detail
                };
                Self::Conflict(message)
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Time windows that bound the account lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct AccountPolicy {
    pub reset_key_validity: Duration,
    pub unactivated_retention: Duration,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            reset_key_validity: Duration::hours(24),
            unactivated_retention: Duration::days(3),
        }
    }
}

impl From<&crate::config::SecurityConfig> for AccountPolicy {
    fn from(config: &crate::config::SecurityConfig) -> Self {
        Self {
            reset_key_validity: Duration::hours(i64::from(config.reset_key_validity_hours)),
            unactivated_retention: Duration::days(i64::from(config.unactivated_retention_days)),
        }
    }
}

/// Decide whether `user` may complete a pending password reset at `now`.
///
/// # Errors
///
/// [`AccountError::NotEligible`] for unactivated accounts or a missing reset
/// date, [`AccountError::Expired`] once the validity window has passed.
pub fn check_reset_eligibility(
    user: &User,
    now: DateTime<Utc>,
    validity: Duration,
) -> Result<(), AccountError> {
    if !user.activated {
        return Err(AccountError::NotEligible);
    }

    let Some(reset_date) = user.reset_date else {
        return Err(AccountError::NotEligible);
    };

    if now.signed_duration_since(reset_date) > validity {
        return Err(AccountError::Expired);
    }

    Ok(())
}

/// Domain service trait for accounts.
///
/// Activation and reset operations return `Ok(None)` for every lookup miss
/// or unmet precondition, so callers cannot tell an unknown email from an
/// unactivated one.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Consumes an activation key and activates its account.
    async fn activate_registration(&self, key: &str) -> Result<Option<User>, AccountError>;

    /// Issues a fresh reset key for an activated account.
    async fn request_password_reset(&self, email: &str) -> Result<Option<User>, AccountError>;

    /// Replaces the password if `key` matches a pending, unexpired reset.
    async fn complete_password_reset(
        &self,
        new_password: &str,
        key: &str,
    ) -> Result<Option<User>, AccountError>;

    /// Registers a new unactivated account with the default role.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] if the login or email is taken.
    async fn create_user_information(&self, account: NewAccount) -> Result<User, AccountError>;

    /// Updates the profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Unauthorized`] if the principal does not resolve.
    async fn update_user_information(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, AccountError>;

    /// Replaces the authenticated user's password.
    async fn change_password(
        &self,
        principal: &Principal,
        new_password: &str,
    ) -> Result<User, AccountError>;

    /// Returns the authenticated user with all authorities loaded.
    async fn get_user_with_authorities(&self, principal: &Principal)
    -> Result<User, AccountError>;

    /// Deletes unactivated accounts past the retention window and returns
    /// how many were removed.
    async fn remove_not_activated_users(&self) -> Result<u64, AccountError>;

    /// Verifies a login/password pair.
    ///
    /// # Errors
    ///
    /// [`AccountError::InvalidCredentials`] for an unknown login or wrong
    /// password, [`AccountError::NotEligible`] if the account is not activated.
    async fn authenticate(&self, login: &str, password: &str) -> Result<User, AccountError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user(activated: bool, reset_date: Option<DateTime<Utc>>) -> User {
        let now = Utc::now();
        User {
            id: 1,
            login: "johndoe".to_string(),
            password_hash: "hash".to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            email: "john.doe@localhost".to_string(),
            activated,
            lang_key: "en-US".to_string(),
            activation_key: None,
            reset_key: reset_date.map(|_| "R1".to_string()),
            reset_date,
            authorities: BTreeSet::from(["ROLE_USER".to_string()]),
            created_date: now,
            last_modified_date: now,
        }
    }

    #[test]
    fn reset_within_window_is_allowed() {
        let now = Utc::now();
        let u = user(true, Some(now - Duration::hours(2)));
        assert!(check_reset_eligibility(&u, now, Duration::hours(24)).is_ok());
    }

    #[test]
    fn reset_exactly_at_window_edge_is_allowed() {
        let now = Utc::now();
        let u = user(true, Some(now - Duration::hours(24)));
        assert!(check_reset_eligibility(&u, now, Duration::hours(24)).is_ok());
    }

    #[test]
    fn reset_after_window_is_expired() {
        let now = Utc::now();
        let u = user(true, Some(now - Duration::hours(25)));
        assert!(matches!(
            check_reset_eligibility(&u, now, Duration::hours(24)),
            Err(AccountError::Expired)
        ));
    }

    #[test]
    fn unactivated_or_dateless_reset_is_not_eligible() {
        let now = Utc::now();
        let unactivated = user(false, Some(now));
        assert!(matches!(
            check_reset_eligibility(&unactivated, now, Duration::hours(24)),
            Err(AccountError::NotEligible)
        ));

        let no_date = user(true, None);
        assert!(matches!(
            check_reset_eligibility(&no_date, now, Duration::hours(24)),
            Err(AccountError::NotEligible)
        ));
    }

    #[test]
    fn generic_db_errors_map_to_database() {
        let err: AccountError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, AccountError::Database(_)));
    }

    #[test]
    fn policy_follows_security_config() {
        let config = crate::config::SecurityConfig {
            reset_key_validity_hours: 12,
            unactivated_retention_days: 7,
            ..Default::default()
        };
        let policy = AccountPolicy::from(&config);
        assert_eq!(policy.reset_key_validity, Duration::hours(12));
        assert_eq!(policy.unactivated_retention, Duration::days(7));
    }
}
