//! Location Resolution Module
//!
//! Resolves the free-text origin and destination of a route request into
//! coordinates, using the single best geocoding match.

use tracing::debug;

use crate::error::RouteEndpoint;
use crate::models::LocationCandidate;
use crate::provider::Geocoder;
use crate::{Result, TrafficPulseError};

/// Service for resolving route endpoints
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve free text to its best match.
    ///
    /// Fails with `LocationNotFound` for the given endpoint when the lookup
    /// returns nothing. Lookup errors are propagated unchanged.
    pub async fn resolve<G: Geocoder + ?Sized>(
        geocoder: &G,
        endpoint: RouteEndpoint,
        query: &str,
    ) -> Result<LocationCandidate> {
        debug!("Geocoding {} '{}'", endpoint, query);

        let best = geocoder.search(query, 1).await?.into_iter().next();
        let Some(best) = best else {
            debug!("No geocoding result for {} '{}'", endpoint, query);
            return Err(TrafficPulseError::location_not_found(endpoint));
        };

        debug!(
            "Resolved {} '{}' to {} ({})",
            endpoint,
            query,
            best.name,
            best.coordinates.format_coordinates()
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedGeocoder {
        known: Vec<(&'static str, Coordinates)>,
        limits: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>> {
            self.limits.lock().unwrap().push(limit);
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

    #[tokio::test]
    async fn test_resolve_uses_limit_one() {
        let geocoder = FixedGeocoder {
            known: vec![("Pune", Coordinates::new(73.8567, 18.5204))],
            limits: Mutex::new(Vec::new()),
        };
        let found = LocationResolver::resolve(&geocoder, RouteEndpoint::Origin, "Pune")
            .await
            .unwrap();
        assert_eq!(found.coordinates, Coordinates::new(73.8567, 18.5204));
        assert_eq!(*geocoder.limits.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_resolve_not_found_names_endpoint() {
        let geocoder = FixedGeocoder {
            known: Vec::new(),
            limits: Mutex::new(Vec::new()),
        };
        let err = LocationResolver::resolve(&geocoder, RouteEndpoint::Destination, "Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrafficPulseError::LocationNotFound {
                endpoint: RouteEndpoint::Destination
            }
        ));
    }
}
