//! Route-corridor stop-point filter.
//!
//! A stop point is kept when its centroid is both close to the route line and
//! lies between origin and destination along the direction of travel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::haversine::{haversine_distance_km, point_to_polyline_distance_km};
use crate::model::StopPointCandidate;
use crate::polyline::Polyline;

/// Default maximum distance from the route line, in km.
pub const DEFAULT_LATERAL_TOLERANCE_KM: f64 = 25.0;

/// Default slack on the origin-destination detour test (20%).
pub const DEFAULT_BETWEEN_TOLERANCE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorConfig {
    /// Maximum centroid distance from the polyline in km.
    pub lateral_tolerance_km: f64,
    /// Multiplier on the straight origin-destination distance that the
    /// origin-centroid-destination detour may not exceed.
    pub between_tolerance: f64,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            lateral_tolerance_km: DEFAULT_LATERAL_TOLERANCE_KM,
            between_tolerance: DEFAULT_BETWEEN_TOLERANCE,
        }
    }
}

/// Returns the candidates that lie inside the corridor, in input order.
///
/// Fails open: with no usable route (fewer than two points) every candidate is
/// returned, so a planner without a route still sees all stop points.
pub fn filter_stop_points(
    candidates: &[StopPointCandidate],
    polyline: &Polyline,
    config: &CorridorConfig,
) -> Vec<StopPointCandidate> {
    let (Some(origin), Some(destination)) = (polyline.first(), polyline.last()) else {
        return candidates.to_vec();
    };
    if polyline.len() < 2 || candidates.is_empty() {
        return candidates.to_vec();
    }

    let end_to_end_km = haversine_distance_km(origin, destination);

    candidates
        .par_iter()
        .filter(|candidate| {
            let Some(centroid) = candidate.centroid() else {
                debug!(stop_point = %candidate.id, "excluded: no parseable boundary points");
                return false;
            };
            in_corridor(centroid, polyline, origin, destination, end_to_end_km, config)
        })
        .cloned()
        .collect()
}

fn in_corridor(
    centroid: Coordinate,
    polyline: &Polyline,
    origin: Coordinate,
    destination: Coordinate,
    end_to_end_km: f64,
    config: &CorridorConfig,
) -> bool {
    let lateral_km = point_to_polyline_distance_km(centroid, polyline);
    if lateral_km > config.lateral_tolerance_km {
        return false;
    }

    let detour_km = haversine_distance_km(centroid, origin) + haversine_distance_km(centroid, destination);
    detour_km <= end_to_end_km * config.between_tolerance
}

/// Centroids of the given stop points in order, skipping any without a
/// parseable boundary. Used as directions waypoints.
pub fn corridor_centroids(selected: &[StopPointCandidate]) -> Vec<Coordinate> {
    selected.iter().filter_map(StopPointCandidate::centroid).collect()
}
