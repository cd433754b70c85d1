//! Aggregate statistics over the stored locations
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The number of locations that share one category value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryCount {
    /// The literal category value. Locations without a category are grouped
    /// under `None`
    pub category: Option<String>,
    pub count: i64,
}

/// Summary of the whole location table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_locations: i64,
    pub category_counts: Vec<CategoryCount>,
}

impl Statistics {
    /// Computes statistics in a single grouping pass over `locations`
    pub fn from_locations<'a, I>(locations: I) -> Self
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut total = 0;
        let mut groups: Vec<CategoryCount> = Vec::new();
        let mut index: HashMap<Option<&str>, usize> = HashMap::new();
        for loc in locations {
            total += 1;
            let key = loc.category.as_deref();
            match index.get(&key) {
                Some(&i) => groups[i].count += 1,
                None => {
                    index.insert(key, groups.len());
                    groups.push(CategoryCount {
                        category: loc.category.clone(),
                        count: 1,
                    });
                }
            }
        }
        // sort_by is stable, so ties keep first-encountered order
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        Self {
            total_locations: total,
            category_counts: groups,
        }
    }

    /// Builds statistics from an already grouped and ordered count
    pub fn from_category_counts(category_counts: Vec<CategoryCount>) -> Self {
        Self {
            total_locations: category_counts.iter().map(|c| c.count).sum(),
            category_counts,
        }
    }
}
