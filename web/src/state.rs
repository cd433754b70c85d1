use crate::logging::Logger;
use libgeoloc::LocationStore;
use std::sync::Arc;
use tracing::trace;

pub struct SharedState {
    pub store: Arc<dyn LocationStore>,
    pub log: Logger,
}

impl SharedState {
    pub fn new(store: Arc<dyn LocationStore>, log: Logger) -> Self {
        trace!("Creating shared app state");
        Self { store, log }
    }

    #[cfg(test)]
    pub fn test(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        tracing::debug!("Creating test shared app state");
        Self::new(
            Arc::new(libgeoloc::Database::from(pool)),
            Logger::disabled(),
        )
    }
}

pub type AppState = Arc<SharedState>;
