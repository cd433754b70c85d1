//! SQLite storage for the location table
use crate::{
    error::Result,
    location::{Filter, Location},
    statistics::CategoryCount,
    store::LocationStore,
};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite, SqlitePool, sqlite::SqliteConnectOptions};
use std::path::Path;
use tracing::{debug, trace};

/// An object that represents a connection to the location database
#[derive(Clone, Debug)]
pub struct Database(Pool<Sqlite>);

impl From<Pool<Sqlite>> for Database {
    /// **WARNING**: This is primarily intended for tests. You should probably
    /// use [Database::open()] instead of creating the pool yourself, since
    /// [Database::open()] will perform database schema migration automatically.
    fn from(value: Pool<Sqlite>) -> Self {
        Self(value)
    }
}

impl Database {
    /// Open a connection to the specified database, creating the file if it
    /// doesn't exist yet. This will also perform any necessary sql migrations
    /// to ensure that the database is up to date with the latest schema changes.
    pub async fn open<P: AsRef<Path>>(db: P) -> Result<Self> {
        debug!(path = ?db.as_ref(), "opening database");
        let dbpool = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(db)
                .create_if_missing(true),
        )
        .await?;
        trace!("Running database migrations");
        sqlx::migrate!("../db/migrations").run(&dbpool).await?;
        Ok(Database(dbpool))
    }

    /// gets a reference to the underlying sqlx connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.0
    }

    /// Waits for all connections to be returned and closes the pool
    pub async fn close(&self) {
        self.0.close().await
    }
}

#[async_trait]
impl LocationStore for Database {
    async fn insert(&self, mut location: Location) -> Result<Location> {
        location.insert(self).await?;
        Ok(location)
    }

    async fn get(&self, id: i64) -> Result<Location> {
        Location::load(id, self).await
    }

    async fn list(&self, filter: Option<Filter>) -> Result<Vec<Location>> {
        Location::load_all(filter, self).await
    }

    async fn update(&self, location: &Location) -> Result<()> {
        location.update(self).await.map(|_| ())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        Location::delete_id(id, self).await.map(|_| ())
    }

    async fn count_by_category(&self) -> Result<Vec<CategoryCount>> {
        Location::count_by_category(self).await
    }
}
