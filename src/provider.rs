//! Seams to the external geocoding and routing services.
//!
//! The suggester and the route requester only talk to these traits, so the
//! vendor client can be swapped for an in-memory fake.

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinates, LocationCandidate, RouteOption};

/// Free-text to coordinates lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for `query`, returning at most `limit` candidates, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>>;
}

/// Route calculation between two points, with live traffic
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Calculate routes from `origin` to `destination`.
    ///
    /// A non-success answer from the service is reported as
    /// [`crate::TrafficPulseError::RouteCalculationFailed`]; an empty list is a
    /// successful answer without routes.
    async fn calculate_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteOption>>;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for std::sync::Arc<T> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>> {
        (**self).search(query, limit).await
    }
}

#[async_trait]
impl<T: RouteProvider + ?Sized> RouteProvider for std::sync::Arc<T> {
    async fn calculate_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteOption>> {
        (**self).calculate_route(origin, destination).await
    }
}

#[async_trait]
impl<'a, T: Geocoder + ?Sized> Geocoder for &'a T {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>> {
        (**self).search(query, limit).await
    }
}

#[async_trait]
impl<'a, T: RouteProvider + ?Sized> RouteProvider for &'a T {
    async fn calculate_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteOption>> {
        (**self).calculate_route(origin, destination).await
    }
}
