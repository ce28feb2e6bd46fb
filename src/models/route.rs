//! Route models: raw routing results, the summary handed to callers and the
//! human-readable labels derived from it.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// One route returned by a routing provider, in provider-neutral form
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteOption {
    /// Route length in meters
    pub length_in_meters: u64,
    /// Travel time including traffic, in seconds
    pub travel_time_in_seconds: u64,
    /// Delay caused by traffic, in seconds
    pub traffic_delay_in_seconds: u64,
    /// All legs' points, concatenated in travel order
    pub points: Vec<Coordinates>,
}

/// Raw numeric summary of a calculated route
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub length_in_meters: u64,
    pub travel_time_in_seconds: u64,
    pub traffic_delay_in_seconds: u64,
    /// When the route was requested
    pub departure_time: DateTime<Utc>,
    /// Departure plus travel time
    pub arrival_time: DateTime<Utc>,
}

impl RouteSummary {
    /// Build a summary for a route requested at `departure_time`
    #[must_use]
    pub fn from_option(option: &RouteOption, departure_time: DateTime<Utc>) -> Self {
        let arrival_time = i64::try_from(option.travel_time_in_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|travel| departure_time.checked_add_signed(travel))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            length_in_meters: option.length_in_meters,
            travel_time_in_seconds: option.travel_time_in_seconds,
            traffic_delay_in_seconds: option.traffic_delay_in_seconds,
            departure_time,
            arrival_time,
        }
    }
}

/// Human-readable labels for a route summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteDisplay {
    pub distance: String,
    pub duration: String,
    pub traffic_delay: String,
    pub arrival_time: String,
}

impl RouteDisplay {
    /// Format a summary, rendering the arrival time in the given time zone
    #[must_use]
    pub fn with_timezone<Tz: TimeZone>(summary: &RouteSummary, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            distance: format_distance(summary.length_in_meters),
            duration: format_duration(summary.travel_time_in_seconds),
            traffic_delay: format_traffic_delay(summary.traffic_delay_in_seconds),
            arrival_time: format_arrival_time(&summary.arrival_time, tz),
        }
    }

    /// Whether the route is slowed down by traffic at all
    #[must_use]
    pub fn has_delay(&self) -> bool {
        self.traffic_delay != NO_DELAY
    }
}

impl From<&RouteSummary> for RouteDisplay {
    fn from(summary: &RouteSummary) -> Self {
        Self::with_timezone(summary, &Local)
    }
}

/// A fully resolved route, ready to be drawn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlannedRoute {
    pub origin: Coordinates,
    pub destination: Coordinates,
    /// Ordered polyline of the whole route
    pub points: Vec<Coordinates>,
    pub summary: RouteSummary,
    pub display: RouteDisplay,
}

const NO_DELAY: &str = "No delay";

/// `800 m` below one kilometer, `1.5 km` above
#[must_use]
pub fn format_distance(length_in_meters: u64) -> String {
    if length_in_meters < 1000 {
        format!("{length_in_meters} m")
    } else {
        // Tenths of a kilometer, halves rounded up
        let tenths = (length_in_meters + 50) / 100;
        format!("{}.{} km", tenths / 10, tenths % 10)
    }
}

/// `1 hr 30 min` from one hour on, `5 min` below
#[must_use]
pub fn format_duration(travel_time_in_seconds: u64) -> String {
    let hours = travel_time_in_seconds / 3600;
    let minutes = (travel_time_in_seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours} hr {minutes} min")
    } else {
        format!("{minutes} min")
    }
}

/// Whole minutes of delay, `No delay` when that rounds down to zero
#[must_use]
pub fn format_traffic_delay(traffic_delay_in_seconds: u64) -> String {
    let minutes = traffic_delay_in_seconds / 60;
    if minutes == 0 {
        NO_DELAY.to_string()
    } else {
        format!("+{minutes} min delay")
    }
}

/// Wall-clock `HH:MM` of the arrival in the given zone
#[must_use]
pub fn format_arrival_time<Tz: TimeZone>(arrival: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    arrival.with_timezone(tz).format("%H:%M").to_string()
}
