//! Translation between [Location] records and their GeoJSON representation.
//!
//! The read path always produces GeoJSON `Feature` and `FeatureCollection`
//! objects. The write path accepts either a GeoJSON `Feature` or a flat object
//! with `name`, `category`, `latitude` and `longitude` keys; see
//! [LocationBody].
use crate::{
    error::{Error, FieldError, FieldErrors, Result},
    location::{Location, LocationFields},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

/// A GeoJSON point. Coordinates are `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: [f64; 2],
}

impl Geometry {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeometryType::Point,
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Geometry,
    pub properties: Properties,
    pub id: i64,
}

impl From<&Location> for Feature {
    fn from(loc: &Location) -> Self {
        Self {
            kind: FeatureType::Feature,
            geometry: Geometry::point(loc.longitude, loc.latitude),
            properties: Properties {
                name: loc.name.clone(),
                category: loc.category.clone(),
            },
            id: loc.id,
        }
    }
}

impl From<Location> for Feature {
    fn from(loc: Location) -> Self {
        Self::from(&loc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

impl<'a> FromIterator<&'a Location> for FeatureCollection {
    fn from_iter<T: IntoIterator<Item = &'a Location>>(iter: T) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features: iter.into_iter().map(Feature::from).collect(),
        }
    }
}

/// A request body after its shape has been determined, but before any fields
/// have been extracted from it
#[derive(Debug, Clone, PartialEq)]
pub enum LocationBody {
    /// A GeoJSON feature, recognized by the presence of a `properties` key
    Feature {
        properties: Map<String, Value>,
        geometry: Option<Value>,
    },
    /// A flat object holding the location fields at the top level
    Flat(Map<String, Value>),
}

impl LocationBody {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(Error::MalformedInput(
                "request body must be a JSON object".to_string(),
            ));
        };
        match obj.remove("properties") {
            Some(Value::Object(properties)) => Ok(Self::Feature {
                properties,
                geometry: obj.remove("geometry"),
            }),
            Some(_) => Err(Error::MalformedInput(
                "'properties' must be an object".to_string(),
            )),
            None => Ok(Self::Flat(obj)),
        }
    }

    /// Extracts the location fields from the body, reporting every field
    /// with an unexpected type
    pub fn into_fields(self) -> Result<LocationFields> {
        let mut errors = FieldErrors::default();
        let fields = match self {
            Self::Feature {
                properties,
                geometry,
            } => {
                let [lon, lat] = point_coordinates(geometry)?;
                LocationFields {
                    name: string_field(&properties, "name", &mut errors),
                    category: nullable_string_field(&properties, "category", &mut errors),
                    longitude: number_field(Some(&lon), "longitude", false, &mut errors),
                    latitude: number_field(Some(&lat), "latitude", false, &mut errors),
                }
            }
            Self::Flat(obj) => LocationFields {
                name: string_field(&obj, "name", &mut errors),
                category: nullable_string_field(&obj, "category", &mut errors),
                latitude: number_field(obj.get("latitude"), "latitude", true, &mut errors),
                longitude: number_field(obj.get("longitude"), "longitude", true, &mut errors),
            },
        };
        errors.into_result()?;
        Ok(fields)
    }
}

/// Decodes a request body of either accepted shape into a set of location fields
pub fn decode(value: Value) -> Result<LocationFields> {
    LocationBody::from_value(value)?.into_fields()
}

fn point_coordinates(geometry: Option<Value>) -> Result<[Value; 2]> {
    let Some(Value::Object(mut geometry)) = geometry else {
        return Err(Error::MalformedInput(
            "'geometry' is required and must be an object".to_string(),
        ));
    };
    match geometry.get("type") {
        None | Some(Value::Null) => {}
        Some(Value::String(t)) if t == "Point" => {}
        Some(other) => {
            return Err(Error::MalformedInput(format!(
                "unsupported geometry type {other}, only 'Point' is supported"
            )));
        }
    }
    let Some(Value::Array(coordinates)) = geometry.remove("coordinates") else {
        return Err(Error::MalformedInput(
            "'geometry.coordinates' is required and must be an array".to_string(),
        ));
    };
    let mut coordinates = coordinates.into_iter();
    match (coordinates.next(), coordinates.next()) {
        (Some(lon), Some(lat)) => Ok([lon, lat]),
        _ => Err(Error::MalformedInput(
            "'geometry.coordinates' must contain [longitude, latitude]".to_string(),
        )),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Option<String> {
    match obj.get(key) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(key, "expected a string"));
            None
        }
    }
}

fn nullable_string_field(
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match obj.get(key) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(_) => {
            errors.push(FieldError::new(key, "expected a string or null"));
            None
        }
    }
}

fn number_field(
    value: Option<&Value>,
    field: &str,
    allow_null: bool,
    errors: &mut FieldErrors,
) -> Option<f64> {
    match value {
        None => None,
        Some(Value::Null) if allow_null => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => {
            errors.push(FieldError::new(field, "expected a number"));
            None
        }
    }
}
