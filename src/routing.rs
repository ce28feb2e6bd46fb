//! Route calculation between two free-text locations.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::error::RouteEndpoint;
use crate::location_resolver::LocationResolver;
use crate::models::{PlannedRoute, RouteDisplay, RouteSummary};
use crate::provider::{Geocoder, RouteProvider};
use crate::{Result, TrafficPulseError};

/// Resolves origin and destination and requests a route with traffic
pub struct RouteRequester<G, R> {
    geocoder: G,
    router: R,
}

impl<G: Geocoder, R: RouteProvider> RouteRequester<G, R> {
    pub fn new(geocoder: G, router: R) -> Self {
        Self { geocoder, router }
    }

    /// Calculate a route departing now
    pub async fn calculate(&self, origin: &str, destination: &str) -> Result<PlannedRoute> {
        self.calculate_at(origin, destination, Utc::now()).await
    }

    /// Calculate a route departing at `departure`.
    ///
    /// Both endpoints are geocoded before any routing request is made; the
    /// origin is reported first when neither resolves.
    #[instrument(skip(self))]
    pub async fn calculate_at(
        &self,
        origin: &str,
        destination: &str,
        departure: DateTime<Utc>,
    ) -> Result<PlannedRoute> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() {
            return Err(TrafficPulseError::validation("Starting point is required"));
        }
        if destination.is_empty() {
            return Err(TrafficPulseError::validation("Destination is required"));
        }

        let (origin_match, destination_match) = futures::join!(
            LocationResolver::resolve(&self.geocoder, RouteEndpoint::Origin, origin),
            LocationResolver::resolve(&self.geocoder, RouteEndpoint::Destination, destination),
        );
        let origin_match = origin_match?;
        let destination_match = destination_match?;

        let routes = self
            .router
            .calculate_route(origin_match.coordinates, destination_match.coordinates)
            .await?;
        let Some(route) = routes.into_iter().next() else {
            debug!("Routing returned no routes for '{}' -> '{}'", origin, destination);
            return Err(TrafficPulseError::NoRoutesFound);
        };

        let summary = RouteSummary::from_option(&route, departure);
        let labels = RouteDisplay::from(&summary);
        info!(
            "Route '{}' -> '{}': {}, {} ({})",
            origin, destination, labels.distance, labels.duration, labels.traffic_delay
        );

        Ok(PlannedRoute {
            origin: origin_match.coordinates,
            destination: destination_match.coordinates,
            points: route.points,
            summary,
            display: labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, LocationCandidate, RouteOption};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MapGeocoder {
        known: Vec<(&'static str, Coordinates)>,
    }

    #[async_trait]
    impl Geocoder for MapGeocoder {
        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<LocationCandidate>> {
            Ok(self
                .known
                .iter()
                .filter(|(name, _)| *name == query)
                .filter_map(|(name, c)| {
                    LocationCandidate::new((*name).into(), (*name).into(), (*name).into(), *c)
                })
                .collect())
        }
    }

    enum Outcome {
        Routes(Vec<RouteOption>),
        Status(u16),
    }

    struct ScriptedRouter {
        outcome: Outcome,
        calls: AtomicUsize,
        requested: Mutex<Option<(Coordinates, Coordinates)>>,
    }

    impl ScriptedRouter {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                requested: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RouteProvider for ScriptedRouter {
        async fn calculate_route(
            &self,
            origin: Coordinates,
            destination: Coordinates,
        ) -> Result<Vec<RouteOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.requested.lock().unwrap() = Some((origin, destination));
            match &self.outcome {
                Outcome::Routes(routes) => Ok(routes.clone()),
                Outcome::Status(status) => {
                    Err(TrafficPulseError::RouteCalculationFailed { status: *status })
                }
            }
        }
    }

    const A: Coordinates = Coordinates::new(77.10, 28.70);
    const B: Coordinates = Coordinates::new(77.20, 28.60);

    fn geocoder() -> MapGeocoder {
        MapGeocoder {
            known: vec![("Location A", A), ("Location B", B)],
        }
    }

    fn route() -> RouteOption {
        RouteOption {
            length_in_meters: 1500,
            travel_time_in_seconds: 300,
            traffic_delay_in_seconds: 0,
            points: vec![A, Coordinates::new(77.15, 28.65), B],
        }
    }

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_successful_route() {
        let router = ScriptedRouter::new(Outcome::Routes(vec![route()]));
        let requester = RouteRequester::new(geocoder(), &router);

        let planned = requester
            .calculate_at("Location A", "Location B", departure())
            .await
            .unwrap();

        assert_eq!(planned.origin, A);
        assert_eq!(planned.destination, B);
        assert_eq!(planned.points.len(), 3);
        assert_eq!(planned.display.distance, "1.5 km");
        assert_eq!(planned.display.duration, "5 min");
        assert_eq!(planned.display.traffic_delay, "No delay");
        assert_eq!(
            planned.summary.arrival_time,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 5, 0).unwrap()
        );
        assert_eq!(*router.requested.lock().unwrap(), Some((A, B)));
    }

    #[tokio::test]
    async fn test_origin_not_found_skips_routing() {
        let router = ScriptedRouter::new(Outcome::Routes(vec![route()]));
        let requester = RouteRequester::new(
            MapGeocoder {
                known: vec![("Location B", B)],
            },
            &router,
        );

        let err = requester
            .calculate_at("Location A", "Location B", departure())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TrafficPulseError::LocationNotFound {
                endpoint: RouteEndpoint::Origin
            }
        ));
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_destination_not_found() {
        let router = ScriptedRouter::new(Outcome::Routes(vec![route()]));
        let requester = RouteRequester::new(geocoder(), &router);

        let err = requester
            .calculate_at("Location A", "Nowhere", departure())
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Could not find destination location");
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_route_request_failure() {
        let router = ScriptedRouter::new(Outcome::Status(500));
        let requester = RouteRequester::new(geocoder(), &router);

        let err = requester
            .calculate_at("Location A", "Location B", departure())
            .await
            .unwrap_err();

        assert!(matches!(err, TrafficPulseError::RouteCalculationFailed { status: 500 }));
    }

    #[tokio::test]
    async fn test_no_routes_found() {
        let router = ScriptedRouter::new(Outcome::Routes(Vec::new()));
        let requester = RouteRequester::new(geocoder(), &router);

        let err = requester
            .calculate_at("Location A", "Location B", departure())
            .await
            .unwrap_err();

        assert!(matches!(err, TrafficPulseError::NoRoutesFound));
    }

    #[tokio::test]
    async fn test_blank_endpoints_are_rejected() {
        let router = ScriptedRouter::new(Outcome::Routes(vec![route()]));
        let requester = RouteRequester::new(geocoder(), &router);

        let err = requester.calculate("  ", "Location B").await.unwrap_err();
        assert!(matches!(err, TrafficPulseError::Validation { .. }));
        assert_eq!(router.calls.load(Ordering::SeqCst), 0);
    }
}
