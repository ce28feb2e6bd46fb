//! Built-in dashboard data: the selectable cities, their traffic statistics
//! and the incident feed.

use std::sync::LazyLock;

use crate::models::{City, CityStats, Coordinates, Incident, IncidentCategory, Severity};

pub const DEFAULT_CITY_ID: &str = "delhi";

// id, name, longitude, latitude, congestion level
const CITY_TABLE: [(&str, &str, f64, f64, u8); 10] = [
    ("delhi", "Delhi", 77.1025, 28.7041, 85),
    ("mumbai", "Mumbai", 72.8777, 19.0760, 90),
    ("bengaluru", "Bengaluru", 77.5946, 12.9716, 82),
    ("chennai", "Chennai", 80.2707, 13.0827, 75),
    ("kolkata", "Kolkata", 88.3639, 22.5726, 80),
    ("hyderabad", "Hyderabad", 78.4867, 17.3850, 72),
    ("pune", "Pune", 73.8567, 18.5204, 68),
    ("ahmedabad", "Ahmedabad", 72.5714, 23.0225, 65),
    ("lucknow", "Lucknow", 80.9462, 26.8467, 60),
    ("jaipur", "Jaipur", 75.7873, 26.9124, 62),
];

// id, avg speed, incidents, congestion change, speed change
const STATS_TABLE: [(&str, u16, u32, i16, i16); 10] = [
    ("delhi", 18, 42, 5, -2),
    ("mumbai", 15, 56, 8, -3),
    ("bengaluru", 16, 38, 6, -2),
    ("chennai", 20, 33, 2, -1),
    ("kolkata", 17, 31, -3, 2),
    ("hyderabad", 22, 27, -2, 1),
    ("pune", 24, 22, 0, 0),
    ("ahmedabad", 25, 25, -4, 2),
    ("lucknow", 28, 19, -5, 3),
    ("jaipur", 26, 15, -8, 4),
];

static CITIES: LazyLock<Vec<City>> = LazyLock::new(|| {
    CITY_TABLE
        .iter()
        .map(|&(id, name, longitude, latitude, congestion_level)| City {
            id: id.to_string(),
            name: name.to_string(),
            coordinates: Coordinates::new(longitude, latitude),
            congestion_level,
        })
        .collect()
});

static INCIDENTS: LazyLock<Vec<Incident>> = LazyLock::new(|| {
    [
        ("1", IncidentCategory::Accident, "Multi-vehicle collision", "Ring Road Northbound, Exit 7", Severity::High, "10:30 AM"),
        ("2", IncidentCategory::Construction, "Road work - lane closure", "MG Road & 5th Cross", Severity::Medium, "09:15 AM"),
        ("3", IncidentCategory::Congestion, "Heavy traffic", "Downtown area", Severity::Medium, "08:45 AM"),
        ("4", IncidentCategory::Weather, "Flooding on roadway", "River Rd near Park", Severity::High, "11:20 AM"),
        ("5", IncidentCategory::Event, "Sports event causing delays", "Stadium area", Severity::Low, "07:30 PM"),
        ("6", IncidentCategory::Accident, "Vehicle overturned", "Highway 48 Southbound", Severity::High, "02:15 PM"),
    ]
    .into_iter()
    .map(|(id, category, description, location, severity, reported_at)| Incident {
        id: id.to_string(),
        category,
        description: description.to_string(),
        location: location.to_string(),
        severity,
        reported_at: reported_at.to_string(),
    })
    .collect()
});

/// All selectable cities, in selector order
pub fn cities() -> &'static [City] {
    &CITIES
}

pub fn find_city(id: &str) -> Option<&'static City> {
    CITIES.iter().find(|city| city.id == id)
}

/// Statistics for a city, falling back to the default city for unknown ids
pub fn city_stats(id: &str) -> CityStats {
    let row = STATS_TABLE
        .iter()
        .find(|(stats_id, ..)| *stats_id == id)
        .or_else(|| STATS_TABLE.iter().find(|(stats_id, ..)| *stats_id == DEFAULT_CITY_ID))
        .unwrap_or(&STATS_TABLE[0]);
    let (stats_id, avg_speed, incident_count, congestion_change, speed_change) = *row;

    CityStats {
        congestion_level: find_city(stats_id).map_or(0, |city| city.congestion_level),
        avg_speed,
        incident_count,
        congestion_change,
        speed_change,
    }
}

pub fn incidents() -> &'static [Incident] {
    &INCIDENTS
}
