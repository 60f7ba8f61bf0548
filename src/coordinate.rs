//! Geographic coordinate value type.
//!
//! A [`Coordinate`] is always within range. Untrusted input goes through
//! [`Coordinate::try_new`] or [`RawCoordinate::parse`]; [`Coordinate::new`] is
//! for values the caller already knows are valid and panics otherwise.

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLng")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LatLng> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: LatLng) -> Result<Self, Self::Error> {
        Coordinate::try_new(value.latitude, value.longitude)
    }
}

impl Coordinate {
    /// Creates a coordinate, panicking if either axis is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        match Self::try_new(latitude, longitude) {
            Ok(coordinate) => coordinate,
            Err(err) => panic!("invalid coordinate ({latitude}, {longitude}): {err}"),
        }
    }

    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        check_axis("latitude", latitude, 90.0)?;
        check_axis("longitude", longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Arithmetic mean of a non-empty set of coordinates.
    pub fn mean(points: &[Coordinate]) -> Option<Coordinate> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lat_sum, lng_sum) = points.iter().fold((0.0, 0.0), |(lat, lng), p| {
            (lat + p.latitude, lng + p.longitude)
        });
        Coordinate::try_new(lat_sum / n, lng_sum / n).ok()
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<(), CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NonFinite { axis });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(CoordinateError::OutOfRange {
            axis,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(())
}

/// An unparsed boundary point as stored by the reference table.
///
/// Reference rows carry free-text numbers, so parsing can fail per point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoordinate {
    #[serde(alias = "lat")]
    pub latitude: String,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: String,
}

impl RawCoordinate {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    pub fn parse(&self) -> Result<Coordinate, CoordinateError> {
        let latitude = parse_axis("latitude", &self.latitude)?;
        let longitude = parse_axis("longitude", &self.longitude)?;
        Coordinate::try_new(latitude, longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(value: Coordinate) -> Self {
        Self::new(value.latitude.to_string(), value.longitude.to_string())
    }
}

fn parse_axis(axis: &'static str, raw: &str) -> Result<f64, CoordinateError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CoordinateError::Unparsable {
            axis,
            raw: raw.to_string(),
        })
}
