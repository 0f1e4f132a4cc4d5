// Application state shared by every handler

use std::sync::Arc;

use crate::config::environment::EnvironmentVariables;
use crate::database::DatabaseService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub database: DatabaseService,
}

impl AppState {
    /// Creates the state from an already validated configuration
    pub fn new(environment: Arc<EnvironmentVariables>) -> Self {
        let database: DatabaseService = DatabaseService::new(environment.clone());

        Self {
            environment,
            database,
        }
    }

    /// Creates the state from the process environment (and `.env` outside production)
    pub fn from_env() -> anyhow::Result<Self> {
        let environment: EnvironmentVariables = EnvironmentVariables::instance()?.clone();
        Ok(Self::new(Arc::new(environment)))
    }

    /// Closes every cached connection pool
    pub async fn shutdown(&self) {
        self.database.shutdown().await;
    }
}
