use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountPolicy, AccountService, Argon2Hasher, SeaOrmAccountService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub account_service: Arc<dyn AccountService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let hasher = Arc::new(Argon2Hasher::from_config(&config.security)?);
        let policy = AccountPolicy::from(&config.security);

        let account_service: Arc<dyn AccountService> =
            Arc::new(SeaOrmAccountService::new(store.clone(), hasher, policy));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            account_service,
        })
    }
}
