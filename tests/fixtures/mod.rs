//! Test fixtures for load-costing.
//!
//! Provides realistic test data including:
//! - Real N3 corridor locations
//! - Builders for stop points and drivers
//! - In-memory providers with scriptable failures

#![allow(dead_code)]

pub mod n3_corridor_locations;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use load_costing::coordinate::{Coordinate, RawCoordinate};
use load_costing::error::ProviderError;
use load_costing::model::{DriverCandidate, LivePosition, Route, StopPointCandidate};
use load_costing::polyline::Polyline;
use load_costing::traits::{DirectionsProvider, Geocoder, LiveTrackingFeed, ReferenceDataProvider};

pub use n3_corridor_locations::*;

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// A single-point stop point at this location.
    pub fn stop_point(&self) -> StopPointCandidate {
        StopPointCandidate::new(slug(self.name), self.name, vec![RawCoordinate::from(self.coordinate())])
    }

    /// A square stop point of half-width `delta` degrees centred here.
    pub fn stop_area(&self, delta: f64) -> StopPointCandidate {
        let corners = [(-delta, -delta), (-delta, delta), (delta, delta), (delta, -delta)];
        let boundary = corners
            .iter()
            .map(|(dlat, dlng)| RawCoordinate::new((self.lat + dlat).to_string(), (self.lng + dlng).to_string()))
            .collect();
        StopPointCandidate::new(slug(self.name), self.name, boundary)
    }
}

pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

pub fn n3_polyline() -> Polyline {
    Polyline::new(N3_ROUTE.iter().map(Location::coordinate).collect())
}

pub fn n3_route() -> Route {
    Route {
        polyline: n3_polyline(),
        distance_km: 568.0,
        duration_secs: 6.0 * 3600.0,
    }
}

pub fn ids(stops: &[StopPointCandidate]) -> Vec<String> {
    stops.iter().map(|stop| stop.id.clone()).collect()
}

pub fn driver(id: &str, first_name: &str, surname: &str) -> DriverCandidate {
    DriverCandidate::new(id, first_name, surname)
}

// ============================================================================
// Providers
// ============================================================================

/// Geocoder backed by a fixed address book.
#[derive(Default)]
pub struct MockGeocoder {
    known: HashMap<String, Coordinate>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, location: &Location) -> Self {
        self.known.insert(address.to_string(), location.coordinate());
        self
    }

    pub fn failing_on(mut self, address: &str) -> Self {
        self.failing.push(address.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|a| a == address) {
            return Err(ProviderError::Unavailable("geocoder timed out".to_string()));
        }
        Ok(self.known.get(address).copied())
    }
}

/// What a [`MockDirections`] does for a request.
pub enum DirectionsBehaviour {
    Route(Route),
    NoRoute,
    Fail,
}

/// Directions provider that answers by origin coordinate.
///
/// A request whose origin is the `gated` coordinate signals `entered` and then
/// blocks until `release` receives, so tests can make a response arrive late.
pub struct MockDirections {
    by_origin: Vec<(Coordinate, DirectionsBehaviour)>,
    default: DirectionsBehaviour,
    gate: Option<Gate>,
    calls: AtomicUsize,
    waypoints_seen: Mutex<Vec<Vec<Coordinate>>>,
}

pub struct Gate {
    pub origin: Coordinate,
    pub entered: Mutex<mpsc::Sender<()>>,
    pub release: Mutex<mpsc::Receiver<()>>,
}

impl MockDirections {
    pub fn always(behaviour: DirectionsBehaviour) -> Self {
        Self {
            by_origin: Vec::new(),
            default: behaviour,
            gate: None,
            calls: AtomicUsize::new(0),
            waypoints_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn for_origin(mut self, origin: &Location, behaviour: DirectionsBehaviour) -> Self {
        self.by_origin.push((origin.coordinate(), behaviour));
        self
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn waypoints_seen(&self) -> Vec<Vec<Coordinate>> {
        self.waypoints_seen.lock().unwrap().clone()
    }
}

impl DirectionsProvider for MockDirections {
    fn route(
        &self,
        origin: Coordinate,
        _destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<Option<Route>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.waypoints_seen.lock().unwrap().push(waypoints.to_vec());

        if let Some(gate) = &self.gate {
            if gate.origin == origin {
                gate.entered.lock().unwrap().send(()).unwrap();
                gate.release.lock().unwrap().recv().unwrap();
            }
        }

        let behaviour = self
            .by_origin
            .iter()
            .find(|(o, _)| *o == origin)
            .map(|(_, b)| b)
            .unwrap_or(&self.default);

        match behaviour {
            DirectionsBehaviour::Route(route) => Ok(Some(route.clone())),
            DirectionsBehaviour::NoRoute => Ok(None),
            DirectionsBehaviour::Fail => Err(ProviderError::Unavailable("directions timed out".to_string())),
        }
    }
}

/// In-memory reference tables.
pub struct MockReference {
    pub stop_points: Result<Vec<StopPointCandidate>, String>,
    pub drivers: Result<Vec<DriverCandidate>, String>,
}

impl ReferenceDataProvider for MockReference {
    fn stop_points(&self) -> Result<Vec<StopPointCandidate>, ProviderError> {
        self.stop_points.clone().map_err(ProviderError::Unavailable)
    }

    fn drivers(&self) -> Result<Vec<DriverCandidate>, ProviderError> {
        self.drivers.clone().map_err(ProviderError::Unavailable)
    }
}

/// Live-tracking feed returning a fixed answer.
pub struct MockFeed(pub Result<Vec<LivePosition>, String>);

impl LiveTrackingFeed for MockFeed {
    fn positions(&self) -> Result<Vec<LivePosition>, ProviderError> {
        self.0.clone().map_err(ProviderError::Unavailable)
    }
}
