//! Seams to the external collaborators of the planner.
//!
//! The planner never talks to a store or a map service directly. Concrete
//! apps implement these for their own backends; `osrm` and `nominatim` ship
//! HTTP implementations of the first two.

use crate::coordinate::Coordinate;
use crate::error::ProviderError;
use crate::model::{DriverCandidate, LivePosition, Route, StopPointCandidate};

/// Turns a free-text address into a coordinate.
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the provider found no match.
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Computes a drivable route between two points.
pub trait DirectionsProvider: Send + Sync {
    /// Route from `origin` to `destination` through `waypoints` in order.
    /// `Ok(None)` means the provider found no route.
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<Option<Route>, ProviderError>;
}

/// Read-only reference tables, fetched once per planning session.
pub trait ReferenceDataProvider {
    fn stop_points(&self) -> Result<Vec<StopPointCandidate>, ProviderError>;

    fn drivers(&self) -> Result<Vec<DriverCandidate>, ProviderError>;
}

/// Periodically refreshed vehicle/driver positions.
pub trait LiveTrackingFeed {
    fn positions(&self) -> Result<Vec<LivePosition>, ProviderError>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        (**self).geocode(address)
    }
}

impl<T: DirectionsProvider + ?Sized> DirectionsProvider for &T {
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<Option<Route>, ProviderError> {
        (**self).route(origin, destination, waypoints)
    }
}
