//! Nominatim HTTP adapter for geocoding.

use serde::Deserialize;
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::ProviderError;
use crate::traits::Geocoder;

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    /// Comma-separated ISO 3166-1 alpha-2 codes to restrict matches to.
    pub country_codes: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("load-costing/", env!("CARGO_PKG_VERSION")).to_string(),
            country_codes: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let mut query = vec![("q", address), ("format", "json"), ("limit", "1")];
        if let Some(codes) = self.config.country_codes.as_deref() {
            query.push(("countrycodes", codes));
        }
        debug!(%url, address, "geocoding");

        let places = self
            .client
            .get(url)
            .query(&query)
            .send()?
            .error_for_status()?
            .json::<Vec<NominatimPlace>>()?;

        first_match(places)
    }
}

/// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn first_match(places: Vec<NominatimPlace>) -> Result<Option<Coordinate>, ProviderError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let parse = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|_| ProviderError::Malformed(format!("non-numeric coordinate {raw:?}")))
    };
    let coordinate = Coordinate::try_new(parse(&place.lat)?, parse(&place.lon)?)
        .map_err(|err| ProviderError::Malformed(err.to_string()))?;

    Ok(Some(coordinate))
}
