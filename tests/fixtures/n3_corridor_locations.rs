//! Real towns and truck stops along the N3 freight corridor
//! (Johannesburg to Durban) and around it.
//!
//! Coordinates are town centres from OpenStreetMap, rounded to 4 decimals.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }
}

pub const JOHANNESBURG: Location = Location::new("Johannesburg", -26.2041, 28.0473);
pub const DURBAN: Location = Location::new("Durban", -29.8587, 31.0218);

// ============================================================================
// N3 route vertices (origin first, destination last)
// ============================================================================

pub const N3_ROUTE: &[Location] = &[
    JOHANNESBURG,
    Location::new("Heidelberg", -26.5040, 28.3580),
    Location::new("Villiers", -27.0306, 28.5986),
    Location::new("Warden", -27.8500, 28.9667),
    Location::new("Harrismith", -28.2773, 29.1294),
    Location::new("Van Reenen", -28.3700, 29.3830),
    Location::new("Ladysmith", -28.5539, 29.7784),
    Location::new("Estcourt", -29.0083, 29.8739),
    Location::new("Mooi River", -29.2130, 29.9930),
    Location::new("Howick", -29.4779, 30.2307),
    Location::new("Pietermaritzburg", -29.6006, 30.3794),
    Location::new("Pinetown", -29.8167, 30.8500),
    DURBAN,
];

// ============================================================================
// Stop points inside the corridor (within 25 km of the route)
// ============================================================================

pub const ON_CORRIDOR: &[Location] = &[
    Location::new("Frankfort", -27.2731, 28.4939),
    Location::new("Colenso", -28.7363, 29.8200),
    Location::new("Tugela Truck Stop", -28.7300, 29.7900),
    Location::new("Estcourt", -29.0083, 29.8739),
    Location::new("Hilton", -29.5500, 30.3000),
];

// ============================================================================
// Stop points outside the corridor
// ============================================================================

pub const OFF_CORRIDOR: &[Location] = &[
    Location::new("Bethlehem", -28.2308, 28.3071),
    Location::new("Newcastle", -27.7577, 29.9318),
    Location::new("Bloemfontein", -29.0852, 26.1596),
    Location::new("Pretoria", -25.7479, 28.2293),
    Location::new("Vereeniging", -26.6731, 27.9261),
    Location::new("Standerton", -26.9333, 29.2333),
];

/// About 29 km off the route: outside the default tolerance, inside 30 km.
pub const WINTERTON: Location = Location::new("Winterton", -28.8167, 29.5333);

/// About 24 km north of Johannesburg, behind the origin.
pub const MIDRAND: Location = Location::new("Midrand", -25.9992, 28.1263);

pub const HEIDELBERG: Location = Location::new("Heidelberg", -26.5040, 28.3580);
