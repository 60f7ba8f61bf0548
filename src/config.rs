//! Planner configuration.
//!
//! Every field has a working default. `from_env` overlays `LOAD_COSTING_*`
//! variables (a `.env` file is honoured) on top of those defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::corridor::CorridorConfig;
use crate::error::ConfigError;
use crate::nominatim::NominatimConfig;
use crate::osrm::OsrmConfig;
use crate::rate_card::RateCard;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub corridor: CorridorConfig,
    pub geocoder: NominatimConfig,
    pub directions: OsrmConfig,
    /// Extra attempts after a failed provider call.
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    /// JSON tariff table; the built-in card is used when unset.
    pub rate_card_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            corridor: CorridorConfig::default(),
            geocoder: NominatimConfig::default(),
            directions: OsrmConfig::default(),
            retry_attempts: 1,
            retry_backoff_ms: 250,
            rate_card_path: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys keep their
    /// defaults; set but unparsable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        set_parsed(&lookup, "LOAD_COSTING_LATERAL_TOLERANCE_KM", &mut config.corridor.lateral_tolerance_km)?;
        set_parsed(&lookup, "LOAD_COSTING_BETWEEN_TOLERANCE", &mut config.corridor.between_tolerance)?;

        if let Some(url) = lookup("LOAD_COSTING_GEOCODER_URL") {
            config.geocoder.base_url = url;
        }
        if let Some(user_agent) = lookup("LOAD_COSTING_GEOCODER_USER_AGENT") {
            config.geocoder.user_agent = user_agent;
        }
        if let Some(codes) = lookup("LOAD_COSTING_GEOCODER_COUNTRY_CODES") {
            config.geocoder.country_codes = Some(codes).filter(|c| !c.trim().is_empty());
        }
        set_parsed(&lookup, "LOAD_COSTING_GEOCODER_TIMEOUT_SECS", &mut config.geocoder.timeout_secs)?;

        if let Some(url) = lookup("LOAD_COSTING_OSRM_URL") {
            config.directions.base_url = url;
        }
        if let Some(profile) = lookup("LOAD_COSTING_OSRM_PROFILE") {
            config.directions.profile = profile;
        }
        set_parsed(&lookup, "LOAD_COSTING_OSRM_TIMEOUT_SECS", &mut config.directions.timeout_secs)?;

        set_parsed(&lookup, "LOAD_COSTING_RETRY_ATTEMPTS", &mut config.retry_attempts)?;
        set_parsed(&lookup, "LOAD_COSTING_RETRY_BACKOFF_MS", &mut config.retry_backoff_ms)?;
        config.rate_card_path = lookup("LOAD_COSTING_RATE_CARD").map(PathBuf::from);

        Ok(config)
    }

    /// The configured tariff table, or the built-in one.
    pub fn rate_card(&self) -> Result<RateCard, ConfigError> {
        match &self.rate_card_path {
            Some(path) => RateCard::from_path(path),
            None => Ok(RateCard::default()),
        }
    }
}

fn set_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key) {
        *target = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}
