//! Planning-session records supplied by the reference store and the
//! live-tracking feed, plus the route shape returned by directions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::{Coordinate, RawCoordinate};
use crate::polyline::Polyline;

/// A named stop point (depot, weighbridge, border post, ...) with a boundary
/// polygon. A single-point boundary is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPointCandidate {
    pub id: String,
    pub name: String,
    pub boundary: Vec<RawCoordinate>,
}

impl StopPointCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, boundary: Vec<RawCoordinate>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            boundary,
        }
    }

    /// Mean of the boundary points that parse. Malformed entries are skipped;
    /// `None` when nothing parses.
    pub fn centroid(&self) -> Option<Coordinate> {
        let parsed: Vec<Coordinate> = self
            .boundary
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(coordinate) => Some(coordinate),
                Err(err) => {
                    debug!(stop_point = %self.id, error = %err, "skipping boundary point");
                    None
                }
            })
            .collect();

        Coordinate::mean(&parsed)
    }
}

/// A driver that can be assigned to a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub is_available: bool,
}

impl DriverCandidate {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            surname: surname.into(),
            is_available: true,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// "First Surname", trimmed. This is the key used against the tracker feed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname).trim().to_string()
    }
}

/// One entry of the live-tracking feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    #[serde(rename = "driverName", alias = "driver_name")]
    pub driver_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LivePosition {
    pub fn new(driver_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            driver_name: driver_name.into(),
            latitude,
            longitude,
        }
    }

    /// The tracked position, or `None` if the tracker reported garbage.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::try_new(self.latitude, self.longitude).ok()
    }
}

/// A driver with their resolved live position and distance to the pickup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDriver {
    pub driver: DriverCandidate,
    pub position: Option<Coordinate>,
    pub distance_km: Option<f64>,
}

/// A route returned by a directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub polyline: Polyline,
    pub distance_km: f64,
    pub duration_secs: f64,
}
