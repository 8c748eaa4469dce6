//! Shared application state

use crate::{
    config::Config,
    services::{PatientService, SessionService},
    startup, Result,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub patient_service: Arc<PatientService>,
    pub session_service: Arc<SessionService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        Self::new_with_options(config, AppStateOptions::default()).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let db_pool = startup::create_db_pool(&config.database).await?;

        if options.run_migrations {
            startup::run_migrations(&db_pool).await?;
        }

        Ok(Self::from_pool(config, db_pool))
    }

    /// Wire services around an existing pool.
    pub fn from_pool(config: Config, db_pool: PgPool) -> Self {
        let patient_service = Arc::new(PatientService::new(db_pool.clone()));
        let session_service = Arc::new(SessionService::new(
            db_pool.clone(),
            config.sessions.clone(),
        ));

        tracing::info!("Application state initialized");

        Self {
            config: Arc::new(config),
            db_pool,
            patient_service,
            session_service,
        }
    }
}
