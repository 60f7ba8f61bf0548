//! Great-circle and corridor distance primitives.
//!
//! Point-to-segment projection treats latitude/longitude as a flat Cartesian
//! plane before measuring the final distance with haversine. That is accurate
//! enough for regional legs (tens to low hundreds of km) but is not a true
//! geodesic projection.

use crate::coordinate::Coordinate;
use crate::polyline::Polyline;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_km(a.into(), b.into())
}

/// Distance from `p` to the segment `start`-`end` in kilometers.
///
/// A zero-length segment degrades to the distance to `start`.
pub fn point_to_segment_distance_km(p: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    let (px, py) = (p.longitude(), p.latitude());
    let (ax, ay) = (start.longitude(), start.latitude());
    let (bx, by) = (end.longitude(), end.latitude());

    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return haversine_distance_km(p, start);
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0);
    let closest = (ay + t * dy, ax + t * dx);

    haversine_km(p.into(), closest)
}

/// Minimum distance from `p` to any segment of `polyline` in kilometers.
///
/// Returns `f64::INFINITY` when the polyline has fewer than two points.
pub fn point_to_polyline_distance_km(p: Coordinate, polyline: &Polyline) -> f64 {
    polyline
        .segments()
        .map(|(start, end)| point_to_segment_distance_km(p, start, end))
        .fold(f64::INFINITY, f64::min)
}

/// Haversine over raw (lat, lng) pairs.
fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    #[test]
    fn test_haversine_same_point() {
        let a = c(-26.2041, 28.0473);
        assert_eq!(haversine_distance_km(a, a), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Johannesburg to Durban, roughly 490 km as the crow flies
        let dist = haversine_distance_km(c(-26.2041, 28.0473), c(-29.8587, 31.0218));
        assert!(dist > 470.0 && dist < 510.0, "JHB to DBN should be ~490km, got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = c(-26.2041, 28.0473);
        let b = c(-28.2366, 29.1121);
        let ab = haversine_distance_km(a, b);
        let ba = haversine_distance_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        let dist = haversine_distance_km(c(0.0, 0.0), c(0.0, 1.0));
        assert!((dist - 111.195).abs() < 0.01, "got {}", dist);
    }

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let p = c(0.3, 0.4);
        let s = c(0.0, 0.0);
        assert_eq!(
            point_to_segment_distance_km(p, s, s),
            haversine_distance_km(p, s)
        );
    }

    #[test]
    fn test_segment_projection_clamps_to_endpoints() {
        let start = c(0.0, 0.0);
        let end = c(0.0, 1.0);
        // Beyond the end of the segment: nearest point is `end`.
        let beyond = c(0.0, 1.5);
        let dist = point_to_segment_distance_km(beyond, start, end);
        assert!((dist - haversine_distance_km(beyond, end)).abs() < 1e-9);

        // Before the start: nearest point is `start`.
        let before = c(0.1, -0.5);
        let dist = point_to_segment_distance_km(before, start, end);
        assert!((dist - haversine_distance_km(before, start)).abs() < 1e-9);
    }

    #[test]
    fn test_segment_perpendicular_distance() {
        let start = c(0.0, 0.0);
        let end = c(0.0, 1.0);
        let p = c(0.1, 0.5);
        let dist = point_to_segment_distance_km(p, start, end);
        let expected = haversine_distance_km(p, c(0.0, 0.5));
        assert!((dist - expected).abs() < 1e-9);
        assert!(dist > 11.0 && dist < 11.2, "got {}", dist);
    }

    #[test]
    fn test_polyline_distance_takes_minimum_segment() {
        let polyline = Polyline::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)]);
        let p = c(0.5, 1.05);
        let dist = point_to_polyline_distance_km(p, &polyline);
        let second_leg = point_to_segment_distance_km(p, c(0.0, 1.0), c(1.0, 1.0));
        assert_eq!(dist, second_leg);
    }

    #[test]
    fn test_polyline_distance_on_vertex_is_zero() {
        let polyline = Polyline::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0)]);
        assert_eq!(point_to_polyline_distance_km(c(0.0, 1.0), &polyline), 0.0);
    }

    #[test]
    fn test_short_polyline_is_infinitely_far() {
        let single = Polyline::new(vec![c(0.0, 0.0)]);
        assert_eq!(point_to_polyline_distance_km(c(0.0, 0.0), &single), f64::INFINITY);
        let empty = Polyline::new(vec![]);
        assert_eq!(point_to_polyline_distance_km(c(0.0, 0.0), &empty), f64::INFINITY);
    }
}
