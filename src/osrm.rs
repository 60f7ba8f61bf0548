//! OSRM HTTP adapter for directions.

use serde::Deserialize;
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::ProviderError;
use crate::model::Route;
use crate::polyline::Polyline;
use crate::traits::DirectionsProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, stops: &[Coordinate]) -> String {
        let coords = stops
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.longitude(), c.latitude()))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl DirectionsProvider for OsrmClient {
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<Option<Route>, ProviderError> {
        let mut stops = Vec::with_capacity(waypoints.len() + 2);
        stops.push(origin);
        stops.extend_from_slice(waypoints);
        stops.push(destination);

        let url = self.route_url(&stops);
        debug!(%url, "requesting OSRM route");

        let body = self
            .client
            .get(url)
            .send()?
            .json::<OsrmRouteResponse>()?;

        route_from_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
    geometry: GeoJsonLineString,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLineString {
    /// `[lng, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

/// OSRM answers `NoRoute` for unroutable pairs and uses other codes for
/// request errors. Only the former is a clean "no route".
fn route_from_response(body: OsrmRouteResponse) -> Result<Option<Route>, ProviderError> {
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Ok(None),
        _ => {
            return Err(ProviderError::Rejected {
                message: body.message.unwrap_or_default(),
                code: body.code,
            });
        }
    }

    let Some(route) = body.routes.into_iter().next() else {
        return Ok(None);
    };

    let points = route
        .geometry
        .coordinates
        .iter()
        .map(|[lng, lat]| Coordinate::try_new(*lat, *lng))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ProviderError::Malformed(format!("route geometry: {err}")))?;

    Ok(Some(Route {
        polyline: Polyline::new(points),
        distance_km: route.distance / 1000.0,
        duration_secs: route.duration,
    }))
}
