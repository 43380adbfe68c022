//! Data models for the USGS GeoJSON summary feed.
//!
//! The raw structures are lenient: every record field is an `Option`, and a
//! field that is missing, `null`, or of the wrong type reads as `None`, so one
//! broken record never fails the whole parse.
//! [`EarthquakeFeature`] is the validated form the rest of the pipeline uses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::QuakemapError;

/// Top-level GeoJSON response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,

    /// Earthquake records, possibly malformed
    #[serde(deserialize_with = "lenient_features")]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse and validate a feed body.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON of the expected shape.
    pub fn from_json(text: &str) -> Result<Self, QuakemapError> {
        let collection: Self = serde_json::from_str(text)?;
        collection.validate()?;
        Ok(collection)
    }

    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns an error if the top-level type is wrong.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakemapError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: Option<String>,

    /// Number of events in response
    pub count: Option<usize>,
}

/// Read a value as `T`, mapping `null` and type mismatches to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Read coordinates element by element; anything that is not a number is `None`.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(Value::as_f64).collect(),
        _ => Vec::new(),
    })
}

/// Read the record list; a record that is not an object becomes an empty one.
fn lenient_features<'de, D>(deserializer: D) -> Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect())
}

/// A single raw feed record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    /// Event ID
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,

    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<Properties>,
}

/// Point geometry of a record.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Vec<Option<f64>>,
}

/// The record properties the map uses.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    #[serde(default, deserialize_with = "lenient")]
    pub mag: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// Event time (ms since epoch)
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<i64>,
}

/// A validated earthquake record.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub id: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometers, negative above sea level
    pub depth_km: f64,
    pub magnitude: f64,
    pub title: String,
    pub time_ms: i64,
}

impl TryFrom<&Feature> for EarthquakeFeature {
    type Error = QuakemapError;

    fn try_from(raw: &Feature) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| {
            let id = raw.id.as_deref().unwrap_or("<no id>");
            QuakemapError::Validation(format!("{id}: {reason}"))
        };

        let geometry = raw.geometry.as_ref().ok_or_else(|| invalid("missing geometry"))?;
        if geometry.coordinates.len() < 3 {
            return Err(invalid(&format!(
                "expected 3 coordinates, got {}",
                geometry.coordinates.len()
            )));
        }
        let coordinate = |index: usize, name: &str| {
            geometry.coordinates[index]
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(&format!("{name} is missing or not finite")))
        };
        let longitude = coordinate(0, "longitude")?;
        let latitude = coordinate(1, "latitude")?;
        let depth_km = coordinate(2, "depth")?;

        let properties = raw
            .properties
            .as_ref()
            .ok_or_else(|| invalid("missing properties"))?;
        let magnitude = properties
            .mag
            .filter(|m| m.is_finite())
            .ok_or_else(|| invalid("magnitude is missing or not finite"))?;
        let title = properties
            .title
            .clone()
            .ok_or_else(|| invalid("missing title"))?;
        let time_ms = properties.time.ok_or_else(|| invalid("missing time"))?;

        Ok(Self {
            id: raw.id.clone(),
            longitude,
            latitude,
            depth_km,
            magnitude,
            title,
            time_ms,
        })
    }
}
