use crate::blockchain::ChainSource;
use crate::config::Config;
use crate::service::WalletService;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub chain: Arc<dyn ChainSource>,
}

impl AppState {
    pub fn wallets(&self) -> WalletService {
        WalletService::new(self.db_pool.clone(), self.chain.clone(), self.config.page_size)
    }
}
