use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::contracts::repo::{ContractSource, MockContracts};
use crate::users::repo::{InMemoryDirectory, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub directory: Arc<dyn UserDirectory>,
    pub contracts: Arc<dyn ContractSource>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let directory =
            Arc::new(InMemoryDirectory::load(&config.users_file).await?) as Arc<dyn UserDirectory>;
        let contracts = Arc::new(MockContracts) as Arc<dyn ContractSource>;
        Ok(Self::from_parts(config, directory, contracts))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        directory: Arc<dyn UserDirectory>,
        contracts: Arc<dyn ContractSource>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config,
            keys,
            directory,
            contracts,
        }
    }

    /// Fixture directory, mock contracts and a fixed test secret.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: "users.test.json".into(),
            jwt: crate::auth::jwt::tests::test_config(),
        });
        let directory =
            Arc::new(crate::users::repo::fixture::directory()) as Arc<dyn UserDirectory>;
        Self::from_parts(config, directory, Arc::new(MockContracts))
    }
}
