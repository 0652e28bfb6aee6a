use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::error;

use trial_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::render::Templates;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub templates: Templates,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub ttl_days: i64,
    /// Mark cookies `Secure`. Off for plain-HTTP local runs.
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn new(db: Database, session: SessionConfig) -> anyhow::Result<AppState> {
        let templates = Templates::load()?;
        Ok(Arc::new(Self {
            db,
            templates,
            session,
        }))
    }
}

/// Run blocking database/hashing work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> ServiceResult<T>
where
    F: FnOnce(&AppStateInner) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ServiceError::Internal(anyhow!("blocking task failed: {}", e))
        })?
}

/// The server's notion of the current calendar date for recruitment windows.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
