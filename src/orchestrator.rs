//! Load-costing orchestrator.
//!
//! Owns the planner's latest inputs and the three derived values (route plan
//! with corridor stop points, driver ranking, cost quote). Each trigger starts
//! a chain that takes a [`Ticket`](crate::latest::Ticket) first and publishes
//! only if nothing newer of the same kind has started since. Provider failures
//! never escape: they become fallback values plus a [`PlanWarning`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::coordinate::Coordinate;
use crate::corridor::{corridor_centroids, filter_stop_points};
use crate::error::{ConfigError, ProviderError};
use crate::latest::{Latest, Publish, Ticket};
use crate::model::{DriverCandidate, LivePosition, RankedDriver, Route, StopPointCandidate};
use crate::nominatim::NominatimClient;
use crate::osrm::OsrmClient;
use crate::rate_card::{CostBreakdown, Quote, RateCard};
use crate::ranking::rank_drivers;
use crate::traits::{DirectionsProvider, Geocoder, LiveTrackingFeed, ReferenceDataProvider};

/// A non-fatal problem to surface to the planner next to the affected value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanWarning {
    AddressNotFound { address: String },
    GeocodingFailed { address: String, reason: String },
    NoRoute,
    DirectionsFailed { reason: String },
    UnknownVehicleType { vehicle_type: String },
    ReferenceDataUnavailable { table: &'static str, reason: String },
    LiveTrackingUnavailable { reason: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressNotFound { address } => write!(f, "address not found: {address}"),
            Self::GeocodingFailed { address, reason } => {
                write!(f, "could not look up {address}: {reason}")
            }
            Self::NoRoute => write!(f, "no route between origin and destination; distance set to 0"),
            Self::DirectionsFailed { reason } => {
                write!(f, "directions unavailable ({reason}); distance set to 0")
            }
            Self::UnknownVehicleType { vehicle_type } => {
                write!(f, "no tariff for vehicle type {vehicle_type}; costs set to 0")
            }
            Self::ReferenceDataUnavailable { table, reason } => {
                write!(f, "{table} could not be loaded: {reason}")
            }
            Self::LiveTrackingUnavailable { reason } => {
                write!(f, "live tracking unavailable ({reason}); using last known positions")
            }
        }
    }
}

/// Reference tables for one planning session.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub stop_points: Vec<StopPointCandidate>,
    pub drivers: Vec<DriverCandidate>,
    pub warnings: Vec<PlanWarning>,
}

impl ReferenceData {
    pub fn new(stop_points: Vec<StopPointCandidate>, drivers: Vec<DriverCandidate>) -> Self {
        Self {
            stop_points,
            drivers,
            warnings: Vec::new(),
        }
    }

    /// Fetches both tables. A table that fails to load is empty and leaves a
    /// warning rather than failing the session.
    pub fn load<P: ReferenceDataProvider + ?Sized>(provider: &P) -> Self {
        let mut warnings = Vec::new();
        let stop_points = provider.stop_points().unwrap_or_else(|err| {
            warn!(error = %err, "stop points unavailable");
            warnings.push(PlanWarning::ReferenceDataUnavailable {
                table: "stop points",
                reason: err.to_string(),
            });
            Vec::new()
        });
        let drivers = provider.drivers().unwrap_or_else(|err| {
            warn!(error = %err, "drivers unavailable");
            warnings.push(PlanWarning::ReferenceDataUnavailable {
                table: "drivers",
                reason: err.to_string(),
            });
            Vec::new()
        });

        info!(stop_points = stop_points.len(), drivers = drivers.len(), "reference data loaded");
        Self {
            stop_points,
            drivers,
            warnings,
        }
    }
}

/// Route and corridor stop points for the current origin/destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    pub origin: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub route: Option<Route>,
    /// Corridor stop points; every candidate while no route is known.
    pub stop_points: Vec<StopPointCandidate>,
    pub selected_stop_point_ids: Vec<String>,
    pub warnings: Vec<PlanWarning>,
}

impl RoutePlan {
    /// Route distance, or 0 when no route is known.
    pub fn distance_km(&self) -> f64 {
        self.route.as_ref().map_or(0.0, |route| route.distance_km)
    }
}

/// Drivers ordered by distance to the pickup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverRanking {
    pub pickup_address: String,
    pub pickup: Option<Coordinate>,
    pub drivers: Vec<RankedDriver>,
    pub warnings: Vec<PlanWarning>,
}

/// Vehicle and trip inputs to the cost chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CostInputs {
    pub vehicle_type: String,
    pub trip_days: f64,
    pub transit_premium: f64,
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            vehicle_type: String::new(),
            trip_days: 1.0,
            transit_premium: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Costing {
    pub inputs: CostInputs,
    pub quote: Quote,
    pub warnings: Vec<PlanWarning>,
}

/// Values written onto the load record when the planner saves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRecordFields {
    pub selected_stop_point_ids: Vec<String>,
    pub vehicle_type: String,
    pub estimated_distance_km: f64,
    pub trip_days: f64,
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    pub transit_premium: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Default)]
struct RouteInputs {
    origin: String,
    destination: String,
    selected: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct RankingInputs {
    pickup_address: String,
    drivers: Arc<Vec<DriverCandidate>>,
    positions: Arc<Vec<LivePosition>>,
}

pub struct LoadCostingOrchestrator<G, D> {
    geocoder: G,
    directions: D,
    config: PlannerConfig,
    rate_card: RateCard,
    stop_points: Vec<StopPointCandidate>,
    session_warnings: Vec<PlanWarning>,
    route_inputs: Mutex<RouteInputs>,
    ranking_inputs: Mutex<RankingInputs>,
    cost_inputs: Mutex<CostInputs>,
    route: Latest<RoutePlan>,
    ranking: Latest<DriverRanking>,
    costing: Latest<Costing>,
}

impl LoadCostingOrchestrator<NominatimClient, OsrmClient> {
    /// Builds HTTP-backed providers from `config` and loads the session's
    /// reference data.
    pub fn from_config<P: ReferenceDataProvider + ?Sized>(
        config: PlannerConfig,
        reference: &P,
    ) -> Result<Self, ConfigError> {
        let geocoder = NominatimClient::new(config.geocoder.clone())?;
        let directions = OsrmClient::new(config.directions.clone())?;
        let rate_card = config.rate_card()?;
        Ok(Self::new(geocoder, directions, ReferenceData::load(reference), rate_card, config))
    }
}

impl<G: Geocoder, D: DirectionsProvider> LoadCostingOrchestrator<G, D> {
    pub fn new(
        geocoder: G,
        directions: D,
        reference: ReferenceData,
        rate_card: RateCard,
        config: PlannerConfig,
    ) -> Self {
        let drivers = Arc::new(reference.drivers);
        let initial_route = RoutePlan {
            stop_points: reference.stop_points.clone(),
            ..RoutePlan::default()
        };
        let initial_ranking = DriverRanking {
            drivers: rank_drivers(&available(&drivers), None, &[]),
            ..DriverRanking::default()
        };

        Self {
            geocoder,
            directions,
            config,
            rate_card,
            stop_points: reference.stop_points,
            session_warnings: reference.warnings,
            route_inputs: Mutex::new(RouteInputs::default()),
            ranking_inputs: Mutex::new(RankingInputs {
                drivers,
                ..RankingInputs::default()
            }),
            cost_inputs: Mutex::new(CostInputs::default()),
            route: Latest::new(initial_route),
            ranking: Latest::new(initial_ranking),
            costing: Latest::default(),
        }
    }

    pub fn route_plan(&self) -> Arc<RoutePlan> {
        self.route.current()
    }

    pub fn driver_ranking(&self) -> Arc<DriverRanking> {
        self.ranking.current()
    }

    pub fn costing(&self) -> Arc<Costing> {
        self.costing.current()
    }

    pub fn rate_card(&self) -> &RateCard {
        &self.rate_card
    }

    /// Every warning attached to the current values, session warnings first.
    pub fn warnings(&self) -> Vec<PlanWarning> {
        let mut warnings = self.session_warnings.clone();
        warnings.extend(self.route.current().warnings.iter().cloned());
        warnings.extend(self.ranking.current().warnings.iter().cloned());
        warnings.extend(self.costing.current().warnings.iter().cloned());
        warnings
    }

    /// Sets origin and destination and reruns the route chain.
    pub fn update_route(&self, origin: &str, destination: &str) -> Publish {
        let (ticket, inputs) = {
            let mut guard = lock(&self.route_inputs);
            guard.origin = origin.to_string();
            guard.destination = destination.to_string();
            (self.route.begin(), guard.clone())
        };
        self.run_route_chain(ticket, inputs)
    }

    /// Sets the stop points the load must pass through, in visiting order,
    /// and reruns the route chain with their centroids as waypoints.
    pub fn select_stop_points<I, S>(&self, ids: I) -> Publish
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (ticket, inputs) = {
            let mut guard = lock(&self.route_inputs);
            guard.selected = ids.into_iter().map(Into::into).collect();
            (self.route.begin(), guard.clone())
        };
        self.run_route_chain(ticket, inputs)
    }

    /// Sets the pickup address and reruns the ranking chain.
    pub fn update_pickup(&self, address: &str) -> Publish {
        let (ticket, inputs) = {
            let mut guard = lock(&self.ranking_inputs);
            guard.pickup_address = address.to_string();
            (self.ranking.begin(), guard.clone())
        };
        self.run_ranking_chain(ticket, inputs, Vec::new())
    }

    /// Replaces the driver list and reruns the ranking chain.
    pub fn set_drivers(&self, drivers: Vec<DriverCandidate>) -> Publish {
        let (ticket, inputs) = {
            let mut guard = lock(&self.ranking_inputs);
            guard.drivers = Arc::new(drivers);
            (self.ranking.begin(), guard.clone())
        };
        self.run_ranking_chain(ticket, inputs, Vec::new())
    }

    /// Replaces the live positions and reruns the ranking chain.
    pub fn set_live_positions(&self, positions: Vec<LivePosition>) -> Publish {
        let (ticket, inputs) = {
            let mut guard = lock(&self.ranking_inputs);
            guard.positions = Arc::new(positions);
            (self.ranking.begin(), guard.clone())
        };
        self.run_ranking_chain(ticket, inputs, Vec::new())
    }

    /// Pulls the feed and reranks. On failure the previous positions are kept
    /// and the ranking carries a warning.
    pub fn refresh_live_positions<F: LiveTrackingFeed + ?Sized>(&self, feed: &F) -> Publish {
        match self.with_retries("live tracking", || feed.positions()) {
            Ok(positions) => self.set_live_positions(positions),
            Err(err) => {
                warn!(error = %err, "live tracking refresh failed; keeping last positions");
                let (ticket, inputs) = {
                    let guard = lock(&self.ranking_inputs);
                    (self.ranking.begin(), guard.clone())
                };
                let warning = PlanWarning::LiveTrackingUnavailable {
                    reason: err.to_string(),
                };
                self.run_ranking_chain(ticket, inputs, vec![warning])
            }
        }
    }

    /// Sets vehicle and trip inputs and reruns the cost chain.
    pub fn update_costing(&self, vehicle_type: &str, trip_days: f64, transit_premium: f64) -> Publish {
        {
            let mut guard = lock(&self.cost_inputs);
            *guard = CostInputs {
                vehicle_type: vehicle_type.to_string(),
                trip_days,
                transit_premium,
            };
        }
        self.recompute_cost()
    }

    /// Reruns the route chain (and so the cost chain) and the ranking chain
    /// concurrently against the current inputs.
    pub fn refresh_all(&self) -> (Publish, Publish) {
        rayon::join(
            || {
                let (ticket, inputs) = {
                    let guard = lock(&self.route_inputs);
                    (self.route.begin(), guard.clone())
                };
                self.run_route_chain(ticket, inputs)
            },
            || {
                let (ticket, inputs) = {
                    let guard = lock(&self.ranking_inputs);
                    (self.ranking.begin(), guard.clone())
                };
                self.run_ranking_chain(ticket, inputs, Vec::new())
            },
        )
    }

    /// Fields to persist on the load record, from the current values.
    pub fn load_record(&self) -> LoadRecordFields {
        let route = self.route.current();
        let costing = self.costing.current();
        let quote = &costing.quote;

        LoadRecordFields {
            selected_stop_point_ids: route.selected_stop_point_ids.clone(),
            vehicle_type: quote.vehicle_type.clone(),
            estimated_distance_km: quote.distance_km,
            trip_days: quote.trip_days,
            breakdown: quote.breakdown,
            transit_premium: quote.transit_premium,
            grand_total: quote.grand_total,
        }
    }

    fn run_route_chain(&self, ticket: Ticket, inputs: RouteInputs) -> Publish {
        let plan = self.plan_route(&inputs);
        let distance_km = plan.distance_km();
        let corridor = plan.stop_points.len();

        let outcome = self.route.publish(ticket, plan);
        match outcome {
            Publish::Applied => {
                info!(seq = ticket.seq(), distance_km, corridor, "route plan updated");
                self.recompute_cost();
            }
            Publish::Superseded => {
                debug!(seq = ticket.seq(), "discarding superseded route plan");
            }
        }
        outcome
    }

    fn plan_route(&self, inputs: &RouteInputs) -> RoutePlan {
        let mut warnings = Vec::new();
        let origin = self.geocode(&inputs.origin, &mut warnings);
        let destination = self.geocode(&inputs.destination, &mut warnings);

        let route = match (origin, destination) {
            (Some(origin), Some(destination)) => {
                let waypoints = corridor_centroids(&self.selected_stop_points(&inputs.selected));
                self.fetch_route(origin, destination, &waypoints, &mut warnings)
            }
            _ => None,
        };

        let stop_points = match &route {
            Some(route) => filter_stop_points(&self.stop_points, &route.polyline, &self.config.corridor),
            None => self.stop_points.clone(),
        };

        RoutePlan {
            origin,
            destination,
            route,
            stop_points,
            selected_stop_point_ids: inputs.selected.clone(),
            warnings,
        }
    }

    fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
        warnings: &mut Vec<PlanWarning>,
    ) -> Option<Route> {
        match self.with_retries("directions", || self.directions.route(origin, destination, waypoints)) {
            Ok(Some(route)) => Some(route),
            Ok(None) => {
                warn!("directions returned no route");
                warnings.push(PlanWarning::NoRoute);
                None
            }
            Err(err) => {
                warn!(error = %err, "directions failed");
                warnings.push(PlanWarning::DirectionsFailed {
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Selected stop points in selection order; unknown ids are skipped.
    fn selected_stop_points(&self, ids: &[String]) -> Vec<StopPointCandidate> {
        ids.iter()
            .filter_map(|id| {
                let found = self.stop_points.iter().find(|stop| &stop.id == id);
                if found.is_none() {
                    debug!(stop_point = %id, "selected stop point not in reference data");
                }
                found.cloned()
            })
            .collect()
    }

    fn run_ranking_chain(
        &self,
        ticket: Ticket,
        inputs: RankingInputs,
        mut warnings: Vec<PlanWarning>,
    ) -> Publish {
        let previous = self.ranking.current();
        let pickup = if previous.pickup_address == inputs.pickup_address && previous.pickup.is_some() {
            previous.pickup
        } else {
            self.geocode(&inputs.pickup_address, &mut warnings)
        };

        let drivers = rank_drivers(&available(&inputs.drivers), pickup, &inputs.positions);
        let ranked = drivers.len();
        let ranking = DriverRanking {
            pickup_address: inputs.pickup_address,
            pickup,
            drivers,
            warnings,
        };

        let outcome = self.ranking.publish(ticket, ranking);
        match outcome {
            Publish::Applied => info!(seq = ticket.seq(), ranked, "driver ranking updated"),
            Publish::Superseded => debug!(seq = ticket.seq(), "discarding superseded driver ranking"),
        }
        outcome
    }

    fn recompute_cost(&self) -> Publish {
        let (ticket, inputs) = {
            let guard = lock(&self.cost_inputs);
            (self.costing.begin(), guard.clone())
        };
        let distance_km = self.route.current().distance_km();

        let mut warnings = Vec::new();
        if !inputs.vehicle_type.trim().is_empty() && self.rate_card.tariff(&inputs.vehicle_type).is_none() {
            warnings.push(PlanWarning::UnknownVehicleType {
                vehicle_type: inputs.vehicle_type.clone(),
            });
        }
        let quote = self.rate_card.quote(
            &inputs.vehicle_type,
            distance_km,
            inputs.trip_days,
            inputs.transit_premium,
        );
        let grand_total = quote.grand_total;

        let outcome = self.costing.publish(
            ticket,
            Costing {
                inputs,
                quote,
                warnings,
            },
        );
        match outcome {
            Publish::Applied => info!(seq = ticket.seq(), distance_km, grand_total, "quote updated"),
            Publish::Superseded => debug!(seq = ticket.seq(), "discarding superseded quote"),
        }
        outcome
    }

    /// `None` for a blank address; lookup failures leave a warning.
    fn geocode(&self, address: &str, warnings: &mut Vec<PlanWarning>) -> Option<Coordinate> {
        if address.trim().is_empty() {
            return None;
        }
        match self.with_retries("geocoding", || self.geocoder.geocode(address)) {
            Ok(Some(coordinate)) => Some(coordinate),
            Ok(None) => {
                warn!(address, "address not found");
                warnings.push(PlanWarning::AddressNotFound {
                    address: address.to_string(),
                });
                None
            }
            Err(err) => {
                warn!(address, error = %err, "geocoding failed");
                warnings.push(PlanWarning::GeocodingFailed {
                    address: address.to_string(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    fn with_retries<T, F>(&self, what: &str, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Result<T, ProviderError>,
    {
        let mut attempt = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.config.retry_attempts => {
                    attempt += 1;
                    debug!(what, attempt, error = %err, "retrying provider call");
                    std::thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn available(drivers: &[DriverCandidate]) -> Vec<DriverCandidate> {
    drivers.iter().filter(|driver| driver.is_available).cloned().collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
