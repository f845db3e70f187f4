use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::entities::users;

/// Account record with its authorities always loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub login: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub activated: bool,
    pub lang_key: String,
    pub activation_key: Option<String>,
    pub reset_key: Option<String>,
    pub reset_date: Option<DateTime<Utc>>,
    pub authorities: BTreeSet<String>,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_model(model: users::Model, authorities: BTreeSet<String>) -> Self {
        Self {
            id: model.id,
            login: model.login,
            password_hash: model.password_hash,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            activated: model.activated,
            lang_key: model.lang_key,
            activation_key: model.activation_key,
            reset_key: model.reset_key,
            reset_date: model.reset_date,
            authorities,
            created_date: model.created_date,
            last_modified_date: model.last_modified_date,
        }
    }

    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// Login of the authenticated caller, resolved by the HTTP session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub lang_key: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub lang_key: String,
}
