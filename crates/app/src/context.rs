//! App Context

use std::{sync::Arc, time::Duration};

use sqlx::{PgPool, migrate::MigrateError};
use thiserror::Error;

use crate::{
    auth::{AuthService, LogNotifier, PgTokenStore, SessionCache, SessionService},
    database,
    users::PgUserDirectory,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

/// Settings needed to assemble the application services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,

    /// Bound on connection acquisition and on each store call.
    pub store_timeout: Duration,

    /// Origin prefixed to activation links.
    pub activation_base_url: String,
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Connect, migrate and build the application services.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting to the database or applying migrations fails.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database_url, settings.store_timeout)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        Ok(Self {
            auth: Arc::new(session_service(pool, settings)),
        })
    }
}

/// Postgres-backed [`SessionService`] with a fresh cache and the logging notifier.
#[must_use]
pub fn session_service(pool: PgPool, settings: &AppSettings) -> SessionService {
    SessionService::new(
        Arc::new(PgTokenStore::new(pool.clone())),
        Arc::new(PgUserDirectory::new(pool)),
        Arc::new(SessionCache::new()),
        Arc::new(LogNotifier),
    )
    .with_store_timeout(settings.store_timeout)
    .with_activation_base_url(settings.activation_base_url.clone())
}
