//! Data models for the TrafficPulse dashboard
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and geocoding candidates
//! - Route: routing results, summaries and display labels
//! - Incident: incidents and the category filter
//! - City: cities and their traffic statistics

pub mod city;
pub mod incident;
pub mod location;
pub mod route;

pub use city::{City, CityStats, CongestionBand, ConditionsSummary, TrafficStatus};
pub use incident::{DashboardFilterSet, Incident, IncidentCategory, Severity};
pub use location::{Coordinates, LocationCandidate};
pub use route::{PlannedRoute, RouteDisplay, RouteOption, RouteSummary};
