//! Per-vehicle-type tariffs and the trip cost formula.
//!
//! Every breakdown is computed whole from its inputs. Nothing here keeps
//! state between calls.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Shortest billable trip, in days.
pub const MIN_TRIP_DAYS: f64 = 0.5;

/// Pricing parameters for one vehicle type.
///
/// Field aliases accept the column names used by the tariff sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeTariff {
    /// Flat fuel allowance per trip.
    pub fuel_rate: f64,
    pub base_rate: f64,
    #[serde(alias = "ppk")]
    pub per_km_rate: f64,
    /// Profit margin as a fraction of the transport subtotal.
    #[serde(alias = "profit_margin_fraction")]
    pub profit_margin: f64,
    #[serde(default, alias = "extra_stop")]
    pub extra_stop_fee: f64,
    /// Charged per trip day after the first.
    #[serde(default, alias = "standing_day")]
    pub standing_day_fee: Option<f64>,
}

/// Cost of a trip for one vehicle type, before the transit premium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fuel_cost: f64,
    pub base_cost: f64,
    pub per_km_cost: f64,
    pub extra_stop_cost: f64,
    pub standing_day_cost: f64,
    pub profit_amount: f64,
    pub transport_subtotal: f64,
    pub total_transport_cost: f64,
    pub cost_per_km: f64,
}

impl CostBreakdown {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// A costed trip: the tariff breakdown plus the goods-in-transit premium.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub vehicle_type: String,
    pub distance_km: f64,
    pub trip_days: f64,
    pub breakdown: CostBreakdown,
    pub transit_premium: f64,
    pub grand_total: f64,
}

/// Tariff lookup keyed by vehicle-type id (trimmed, upper-case).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateCard {
    tariffs: BTreeMap<String, VehicleTypeTariff>,
}

impl Default for RateCard {
    fn default() -> Self {
        let mut card = Self::empty();
        card.insert("TAUTLINER", tariff(4070.0, 7280.0, 3.00, 0.111, 0.0, Some(2500.0)));
        card.insert("SUPERLINK", tariff(5200.0, 8900.0, 3.60, 0.111, 450.0, Some(3000.0)));
        card.insert("FLATBED", tariff(3900.0, 6800.0, 2.85, 0.111, 0.0, Some(2300.0)));
        card.insert("REFRIGERATED", tariff(4800.0, 9100.0, 3.75, 0.125, 450.0, Some(3200.0)));
        card.insert("RIGID_8T", tariff(2100.0, 3600.0, 2.10, 0.10, 250.0, None));
        card
    }
}

fn tariff(
    fuel_rate: f64,
    base_rate: f64,
    per_km_rate: f64,
    profit_margin: f64,
    extra_stop_fee: f64,
    standing_day_fee: Option<f64>,
) -> VehicleTypeTariff {
    VehicleTypeTariff {
        fuel_rate,
        base_rate,
        per_km_rate,
        profit_margin,
        extra_stop_fee,
        standing_day_fee,
    }
}

impl RateCard {
    pub fn empty() -> Self {
        Self {
            tariffs: BTreeMap::new(),
        }
    }

    /// Parses a JSON object of vehicle-type id to tariff.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, VehicleTypeTariff> = serde_json::from_str(json)?;
        let mut card = Self::empty();
        for (vehicle_type, tariff) in raw {
            card.insert(&vehicle_type, tariff);
        }
        Ok(card)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let card = Self::from_json_str(&json)?;
        debug!(path = %path.as_ref().display(), vehicle_types = card.tariffs.len(), "loaded rate card");
        Ok(card)
    }

    pub fn insert(&mut self, vehicle_type: &str, tariff: VehicleTypeTariff) {
        self.tariffs.insert(normalize(vehicle_type), tariff);
    }

    pub fn tariff(&self, vehicle_type: &str) -> Option<&VehicleTypeTariff> {
        self.tariffs.get(&normalize(vehicle_type))
    }

    pub fn vehicle_types(&self) -> impl Iterator<Item = &str> {
        self.tariffs.keys().map(String::as_str)
    }

    /// Tariff cost of a trip.
    ///
    /// An unknown vehicle type yields an all-zero breakdown. Negative or
    /// non-finite distance counts as 0 km; trip days are floored at
    /// [`MIN_TRIP_DAYS`].
    pub fn compute_cost(&self, vehicle_type: &str, distance_km: f64, trip_days: f64) -> CostBreakdown {
        let Some(tariff) = self.tariff(vehicle_type) else {
            if !vehicle_type.trim().is_empty() {
                warn!(vehicle_type, "no tariff for vehicle type; costing as zero");
            }
            return CostBreakdown::default();
        };

        let distance_km = non_negative(distance_km);
        let trip_days = billable_days(trip_days);

        let fuel_cost = tariff.fuel_rate;
        let base_cost = tariff.base_rate;
        let per_km_cost = distance_km * tariff.per_km_rate;
        // The first day is covered by the base rate.
        let standing_day_cost = tariff.standing_day_fee.unwrap_or(0.0) * (trip_days - 1.0).max(0.0);
        let transport_subtotal = fuel_cost + base_cost + per_km_cost + standing_day_cost;
        let profit_amount = transport_subtotal * tariff.profit_margin;
        let extra_stop_cost = tariff.extra_stop_fee;
        let total_transport_cost = transport_subtotal + profit_amount + extra_stop_cost;
        let cost_per_km = if distance_km > 0.0 {
            total_transport_cost / distance_km
        } else {
            0.0
        };

        CostBreakdown {
            fuel_cost,
            base_cost,
            per_km_cost,
            extra_stop_cost,
            standing_day_cost,
            profit_amount,
            transport_subtotal,
            total_transport_cost,
            cost_per_km,
        }
    }

    /// Tariff cost plus the trip-specific transit premium.
    pub fn quote(&self, vehicle_type: &str, distance_km: f64, trip_days: f64, transit_premium: f64) -> Quote {
        let breakdown = self.compute_cost(vehicle_type, distance_km, trip_days);
        let transit_premium = non_negative(transit_premium);

        Quote {
            vehicle_type: normalize(vehicle_type),
            distance_km: non_negative(distance_km),
            trip_days: billable_days(trip_days),
            breakdown,
            transit_premium,
            grand_total: breakdown.total_transport_cost + transit_premium,
        }
    }
}

fn normalize(vehicle_type: &str) -> String {
    vehicle_type.trim().to_uppercase()
}

fn billable_days(trip_days: f64) -> f64 {
    if trip_days.is_finite() { trip_days.max(MIN_TRIP_DAYS) } else { MIN_TRIP_DAYS }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
