//! `TrafficPulse` - Real-time traffic dashboard
//!
//! This library provides location suggestions, route planning with live
//! traffic, map rendering and the dashboard state behind the web UI.

pub mod api;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location_resolver;
pub mod map;
pub mod models;
pub mod provider;
pub mod routing;
pub mod suggest;
pub mod telemetry;
pub mod tomtom;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::TrafficPulseConfig;
pub use dashboard::{DashboardSnapshot, DashboardState};
pub use error::{RouteEndpoint, TrafficPulseError};
pub use map::{MapRenderer, MapScene, MapSurface, SceneSurface};
pub use models::{Coordinates, Incident, LocationCandidate, PlannedRoute};
pub use provider::{Geocoder, RouteProvider};
pub use routing::RouteRequester;
pub use suggest::LocationSuggester;
pub use tomtom::TomTomClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TrafficPulseError>;
