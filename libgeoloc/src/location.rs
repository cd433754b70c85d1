//! Objects to manage named point locations
use crate::{
    Database,
    error::{Error, FieldError, FieldErrors, Result},
    statistics::CategoryCount,
};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, sqlite::SqliteQueryResult};
use tracing::trace;

/// A type for specifying fields that can be used for filtering a database query
/// for locations
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Match the ID of the location to the given value
    Id(i64),

    /// Match the category of the location exactly. `None` matches locations
    /// without a category
    Category(Option<String>),
}

impl Filter {
    fn add_to_query(&self, builder: &mut QueryBuilder<Sqlite>) {
        match self {
            Self::Id(id) => _ = builder.push(" L.locid = ").push_bind(*id),
            Self::Category(Some(cat)) => _ = builder.push(" L.category = ").push_bind(cat.clone()),
            Self::Category(None) => _ = builder.push(" L.category IS NULL"),
        }
    }
}

/// A named point on the map
#[derive(Debug, sqlx::FromRow, Deserialize, Serialize, PartialEq, Clone)]
pub struct Location {
    /// A unique ID that identifies this location in the database
    #[sqlx(rename = "locid")]
    pub id: i64,

    /// The name of the location
    #[sqlx(rename = "locname")]
    pub name: String,

    /// An optional free-form category such as "park" or "cafe"
    #[sqlx(default)]
    pub category: Option<String>,

    /// Latitude in degrees. Not range-checked.
    pub latitude: f64,

    /// Longitude in degrees. Not range-checked.
    pub longitude: f64,
}

impl Location {
    /// The placeholder id of an object that has not been inserted yet
    pub const fn invalid_id() -> i64 {
        -1
    }

    /// Creates a new location object with the given data. It will initially have
    /// an invalid ID until it is inserted into the database
    pub fn new(name: String, category: Option<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Self::invalid_id(),
            name,
            category,
            latitude,
            longitude,
        }
    }

    fn build_query(filter: Option<Filter>) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            r#"SELECT L.locid, L.locname, L.category, L.latitude, L.longitude
            FROM gl_locations L"#,
        );
        if let Some(f) = filter {
            qb.push(" WHERE ");
            f.add_to_query(&mut qb);
        }
        qb.push(" ORDER BY L.locid ASC");
        qb
    }

    /// Loads a single location from the database
    pub async fn load(id: i64, db: &Database) -> Result<Location> {
        Self::build_query(Some(Filter::Id(id)))
            .build_query_as()
            .fetch_optional(db.pool())
            .await?
            .ok_or(Error::NotFound(id))
    }

    /// Loads all matching locations from the database in insertion order
    pub async fn load_all(filter: Option<Filter>, db: &Database) -> Result<Vec<Location>> {
        Self::build_query(filter)
            .build_query_as()
            .fetch_all(db.pool())
            .await
            .map_err(|e| e.into())
    }

    /// Add this location to the database. If this call completes successfully,
    /// the id of this object will be updated to the ID of the inserted row in the
    /// database
    pub async fn insert(&mut self, db: &Database) -> Result<SqliteQueryResult> {
        if self.id != Self::invalid_id() {
            return Err(Error::InvalidInsertObjectAlreadyExists(self.id));
        }

        sqlx::query(
            r#"INSERT INTO gl_locations
          (locname, category, latitude, longitude)
          VALUES (?, ?, ?, ?)"#,
        )
        .bind(&self.name)
        .bind(&self.category)
        .bind(self.latitude)
        .bind(self.longitude)
        .execute(db.pool())
        .await
        .inspect(|r| self.id = r.last_insert_rowid())
        .map_err(|e| e.into())
    }

    /// Update the location in the database such that it matches this object
    pub async fn update(&self, db: &Database) -> Result<SqliteQueryResult> {
        if self.id < 0 {
            return Err(Error::NotFound(self.id));
        }

        let res = sqlx::query(
            "UPDATE gl_locations SET locname=?, category=?, latitude=?, longitude=? WHERE locid=?",
        )
        .bind(&self.name)
        .bind(&self.category)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(self.id)
        .execute(db.pool())
        .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(self.id));
        }
        Ok(res)
    }

    /// Delete the location with the given id. Deleting an id that does not
    /// exist is an error
    pub async fn delete_id(id: i64, db: &Database) -> Result<SqliteQueryResult> {
        let res = sqlx::query("DELETE FROM gl_locations WHERE locid=?1")
            .bind(id)
            .execute(db.pool())
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(res)
    }

    /// Counts locations per category, largest group first. Groups with equal
    /// counts are ordered by the first location that appeared in them.
    pub async fn count_by_category(db: &Database) -> Result<Vec<CategoryCount>> {
        trace!("counting locations by category");
        sqlx::query_as(
            r#"SELECT category, COUNT(*) AS count FROM gl_locations
            GROUP BY category ORDER BY count DESC, MIN(locid) ASC"#,
        )
        .fetch_all(db.pool())
        .await
        .map_err(|e| e.into())
    }
}

/// The set of location fields supplied in a request body. A field that was
/// absent from the body is `None`.
///
/// `category` distinguishes between an absent value (`None`) and an explicit
/// `null` (`Some(None)`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LocationFields {
    pub name: Option<String>,
    pub category: Option<Option<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationFields {
    /// The supplied name, or an empty string if none was given
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The supplied category. An absent category defaults to an empty string
    pub fn category(&self) -> Option<&str> {
        match &self.category {
            None => Some(""),
            Some(c) => c.as_deref(),
        }
    }

    /// Builds a complete location from these fields. Both coordinates are
    /// required; missing string fields take their defaults.
    pub fn into_location(self) -> Result<Location> {
        let mut errors = FieldErrors::default();
        if self.latitude.is_none() {
            errors.push(FieldError::new("latitude", "this field is required"));
        }
        if self.longitude.is_none() {
            errors.push(FieldError::new("longitude", "this field is required"));
        }
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(Error::Validation(errors));
        };
        let category = self.category().map(str::to_string);
        Ok(Location::new(
            self.name.unwrap_or_default(),
            category,
            latitude,
            longitude,
        ))
    }

    /// Replaces every field of `loc` with these fields, keeping its id
    pub fn replace(self, loc: &mut Location) -> Result<()> {
        let id = loc.id;
        *loc = self.into_location()?;
        loc.id = id;
        Ok(())
    }

    /// Overwrites only the fields of `loc` that were supplied
    pub fn apply_to(self, loc: &mut Location) {
        if let Some(name) = self.name {
            loc.name = name;
        }
        if let Some(category) = self.category {
            loc.category = category;
        }
        if let Some(latitude) = self.latitude {
            loc.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            loc.longitude = longitude;
        }
    }
}
