//! City model and the traffic statistics shown per city

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// A city the dashboard can be centered on
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    /// Map center for the city
    pub coordinates: Coordinates,
    /// Share of monitored roads that are saturated, in percent
    pub congestion_level: u8,
}

/// Traffic statistics panel data for a city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub congestion_level: u8,
    /// Average speed across major roads, in mph
    pub avg_speed: u16,
    pub incident_count: u32,
    /// Change against normal conditions, in percentage points
    pub congestion_change: i16,
    /// Change against normal conditions, in mph
    pub speed_change: i16,
}

impl CityStats {
    /// Average speed as a share of the 40 mph gauge, clamped to 100
    #[must_use]
    pub fn speed_gauge_percent(&self) -> u8 {
        let percent = u32::from(self.avg_speed) * 100 / 40;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    #[must_use]
    pub fn congestion_band(&self) -> CongestionBand {
        CongestionBand::from_level(self.congestion_level)
    }
}

/// Coarse traffic status derived from the congestion level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TrafficStatus {
    Heavy,
    Moderate,
    Light,
}

impl TrafficStatus {
    #[must_use]
    pub fn from_congestion(level: u8) -> Self {
        match level {
            80.. => TrafficStatus::Heavy,
            60..=79 => TrafficStatus::Moderate,
            _ => TrafficStatus::Light,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TrafficStatus::Heavy => "Heavy Traffic",
            TrafficStatus::Moderate => "Moderate Traffic",
            TrafficStatus::Light => "Light Traffic",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            TrafficStatus::Heavy => "Significant delays expected on major roads",
            TrafficStatus::Moderate => "Some delays on main routes",
            TrafficStatus::Light => "Roads are generally clear",
        }
    }
}

/// Colour band of the congestion gauge
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CongestionBand {
    Red,
    Yellow,
    Orange,
    Green,
}

impl CongestionBand {
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            80.. => CongestionBand::Red,
            60..=79 => CongestionBand::Yellow,
            40..=59 => CongestionBand::Orange,
            _ => CongestionBand::Green,
        }
    }
}

/// Summary line shown above the map
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsSummary {
    pub city: String,
    pub status: TrafficStatus,
    pub label: String,
    pub description: String,
}

impl ConditionsSummary {
    #[must_use]
    pub fn for_city(city: &City) -> Self {
        let status = TrafficStatus::from_congestion(city.congestion_level);
        Self {
            city: city.name.clone(),
            status,
            label: status.label().to_string(),
            description: status.description().to_string(),
        }
    }
}
