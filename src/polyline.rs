//! Polyline representation for route geometries.
//!
//! Directions providers hand back a route as an ordered list of coordinates,
//! origin first and destination last. Provider-specific encodings are
//! decoded at the adapter boundary, never here.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A polyline representing a travelled path as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Origin of the path.
    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    /// Destination of the path.
    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// Consecutive point pairs. Empty for fewer than two points.
    pub fn segments(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

impl From<Vec<Coordinate>> for Polyline {
    fn from(points: Vec<Coordinate>) -> Self {
        Self::new(points)
    }
}
