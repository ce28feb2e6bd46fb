//! Location model for geographic coordinates and geocoding candidates

use serde::{Deserialize, Serialize};

/// Longitude/latitude pair.
///
/// Serialized as `[longitude, latitude]`, the ordering the map SDK expects.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Latitude in decimal degrees
    pub latitude: f64,
}

impl Coordinates {
    /// Create coordinates from a longitude/latitude pair
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as `lat,lon`, the ordering used in routing URLs
    #[must_use]
    pub fn to_lat_lon(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Format coordinates for log output
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.longitude, value.latitude]
    }
}

/// A ranked geocoding result offered to the user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationCandidate {
    /// Provider identifier of the result
    pub id: String,
    /// Short display name (POI name or the address itself)
    pub name: String,
    /// Free-form address
    pub address: String,
    /// Position of the result
    pub coordinates: Coordinates,
}

impl LocationCandidate {
    /// Create a candidate, rejecting positions outside the valid ranges
    #[must_use]
    pub fn new(id: String, name: String, address: String, coordinates: Coordinates) -> Option<Self> {
        coordinates.is_valid().then_some(Self {
            id,
            name,
            address,
            coordinates,
        })
    }
}
