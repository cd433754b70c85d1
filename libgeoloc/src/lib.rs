//! This is a library that provides the storage and GeoJSON translation of
//! named point locations.

pub mod database;
pub mod error;
pub mod geojson;
pub mod location;
pub mod statistics;
pub mod store;

pub use database::Database;
pub use error::Error;
pub use error::Result;
pub use store::LocationStore;
