//! load-costing core
//!
//! Route-corridor stop-point filtering, driver-proximity ranking and rate-card
//! costing for freight load planning.

pub mod config;
pub mod coordinate;
pub mod corridor;
pub mod error;
pub mod haversine;
pub mod latest;
pub mod model;
pub mod nominatim;
pub mod orchestrator;
pub mod osrm;
pub mod polyline;
pub mod ranking;
pub mod rate_card;
pub mod traits;
