//! Driver-proximity ranking against a pickup location.
//!
//! Live positions come from the tracking feed and are matched to drivers by
//! display name. That match is fragile (name collisions, spelling drift); a
//! driver without a match keeps an unknown distance and sorts last.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::coordinate::Coordinate;
use crate::haversine::haversine_distance_km;
use crate::model::{DriverCandidate, LivePosition, RankedDriver};
use crate::traits::Geocoder;

/// First feed entry whose name matches the driver's display name,
/// case-insensitively and ignoring surrounding whitespace.
pub fn resolve_live_position(driver: &DriverCandidate, feed: &[LivePosition]) -> Option<Coordinate> {
    let name = driver.display_name().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let entry = feed
        .iter()
        .find(|position| position.driver_name.trim().to_lowercase() == name)?;

    let coordinate = entry.coordinate();
    if coordinate.is_none() {
        debug!(driver = %driver.id, "tracked position out of range");
    }
    coordinate
}

/// Orders drivers by distance to `pickup`, nearest first.
///
/// Drivers with no known position follow every driver with one, in their
/// input order. With no pickup coordinate the input order is kept and every
/// distance is `None`.
pub fn rank_drivers(
    drivers: &[DriverCandidate],
    pickup: Option<Coordinate>,
    feed: &[LivePosition],
) -> Vec<RankedDriver> {
    let mut ranked: Vec<RankedDriver> = drivers
        .iter()
        .map(|driver| {
            let position = resolve_live_position(driver, feed);
            let distance_km = match (pickup, position) {
                (Some(pickup), Some(position)) => Some(round_to_tenth(haversine_distance_km(pickup, position))),
                _ => None,
            };
            RankedDriver {
                driver: driver.clone(),
                position,
                distance_km,
            }
        })
        .collect();

    if pickup.is_some() {
        // `sort_by` is stable, so unknown distances keep their relative order.
        ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
    }

    ranked
}

/// Geocodes `pickup_address` and ranks against it.
///
/// A failed or empty geocode degrades to the unranked input order.
pub fn rank_drivers_by_distance<G: Geocoder + ?Sized>(
    drivers: &[DriverCandidate],
    pickup_address: &str,
    feed: &[LivePosition],
    geocoder: &G,
) -> Vec<RankedDriver> {
    let pickup = match geocoder.geocode(pickup_address) {
        Ok(Some(coordinate)) => Some(coordinate),
        Ok(None) => {
            warn!(address = pickup_address, "pickup not found; drivers left unranked");
            None
        }
        Err(err) => {
            warn!(address = pickup_address, error = %err, "pickup geocoding failed; drivers left unranked");
            None
        }
    };

    rank_drivers(drivers, pickup, feed)
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
