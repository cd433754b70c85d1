//! The persistence interface used by the request handlers
use crate::{
    error::Result,
    location::{Filter, Location},
    statistics::{CategoryCount, Statistics},
};
use async_trait::async_trait;

/// A store of [Location] records.
///
/// Implementations are responsible for their own concurrency control. Every
/// method is a single attempt; failures are returned to the caller unchanged.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Inserts a new location and returns it with its assigned id
    async fn insert(&self, location: Location) -> Result<Location>;

    /// Loads the location with the given id, failing with
    /// [crate::Error::NotFound] if there is none
    async fn get(&self, id: i64) -> Result<Location>;

    /// Loads all matching locations in insertion order
    async fn list(&self, filter: Option<Filter>) -> Result<Vec<Location>>;

    /// Replaces the stored record that has the same id as `location`
    async fn update(&self, location: &Location) -> Result<()>;

    /// Removes the location with the given id
    async fn delete(&self, id: i64) -> Result<()>;

    /// Counts locations per category, largest group first
    async fn count_by_category(&self) -> Result<Vec<CategoryCount>> {
        let locations = self.list(None).await?;
        Ok(Statistics::from_locations(&locations).category_counts)
    }

    async fn statistics(&self) -> Result<Statistics> {
        self.count_by_category()
            .await
            .map(Statistics::from_category_counts)
    }
}
