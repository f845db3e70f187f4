pub mod account_service;
pub mod account_service_impl;
pub mod password;
pub mod tokens;

pub use account_service::{AccountError, AccountPolicy, AccountService};
pub use account_service_impl::SeaOrmAccountService;
pub use password::{Argon2Hasher, CredentialHasher};
