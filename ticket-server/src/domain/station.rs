//! Stations and great-circle distance.

use super::StationId;

const EARTH_RADIUS_KM: f64 = 6367.0;

/// A railway station with its GPS coordinates.
///
/// Coordinates come straight from the GTFS `stops.txt` import and are only
/// used for distance (and therefore fare) computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    /// Display name, e.g. "Paris Gare de Lyon".
    pub name: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Station {
    /// Creates a new station.
    pub fn new(id: StationId, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id,
            name: name.into(),
            lat,
            lng,
        }
    }

    /// Great-circle distance to another station, in kilometers.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticket_server::domain::{Station, StationId};
    ///
    /// let a = Station::new(StationId(1), "A", 0.0, 0.0);
    /// let b = Station::new(StationId(2), "B", 0.0, 1.0);
    ///
    /// // One degree of longitude on the equator is ~111 km.
    /// let d = a.distance_to(&b);
    /// assert!((d - 111.12).abs() < 0.1);
    /// ```
    pub fn distance_to(&self, other: &Station) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine distance between two GPS coordinates, in kilometers.
fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for near-antipodal points, which
    // would make asin return NaN.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
