//! TomTom Search and Routing API client
//!
//! This module provides the HTTP client used for location search and route
//! calculation with live traffic. Requests run with a fixed timeout; retries
//! of transient failures are off unless configured.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::TomTomConfig;
use crate::models::{Coordinates, LocationCandidate, RouteOption};
use crate::provider::{Geocoder, RouteProvider};
use crate::{Result, TrafficPulseError};

/// Client for the TomTom REST APIs
pub struct TomTomClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    travel_mode: String,
}

impl TomTomClient {
    /// Create a client, failing with `NotConfigured` when no key is set
    pub fn new(config: &TomTomConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(TrafficPulseError::NotConfigured)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TrafficPulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrafficPulseError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            travel_mode: config.travel_mode.clone(),
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/search/2/search/{}.json?key={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            self.api_key,
            limit
        )
    }

    fn route_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/routing/1/calculateRoute/{}:{}/json?key={}&traffic=true&travelMode={}",
            self.base_url,
            origin.to_lat_lon(),
            destination.to_lat_lon(),
            self.api_key,
            self.travel_mode
        )
    }

    /// URL with the key blanked out, for logs
    fn redact(&self, url: &str) -> String {
        url.replace(&self.api_key, "***")
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| match TrafficPulseError::from(e) {
                TrafficPulseError::Api { message } => TrafficPulseError::api(self.redact(&message)),
                other => other,
            })
    }
}

#[async_trait]
impl Geocoder for TomTomClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>> {
        let url = self.search_url(query, limit);
        debug!("TomTom search request: {}", self.redact(&url));
        let start = Instant::now();

        let response = self.send(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Location search for '{}' failed with status {}", query, status);
            return Err(TrafficPulseError::api(format!(
                "Location search failed with status {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| TrafficPulseError::api(format!("Invalid search response: {e}")))?;
        let candidates = body.into_candidates();

        info!(
            "Found {} locations for '{}' in {:.3}s",
            candidates.len(),
            query,
            start.elapsed().as_secs_f64()
        );
        Ok(candidates)
    }
}

#[async_trait]
impl RouteProvider for TomTomClient {
    #[instrument(skip(self))]
    async fn calculate_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteOption>> {
        let url = self.route_url(origin, destination);
        debug!("TomTom routing request: {}", self.redact(&url));
        let start = Instant::now();

        let response = self.send(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Route calculation failed with status {}", status);
            return Err(TrafficPulseError::RouteCalculationFailed {
                status: status.as_u16(),
            });
        }

        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| TrafficPulseError::api(format!("Invalid routing response: {e}")))?;
        let routes = body.into_options();

        info!(
            "Received {} routes in {:.3}s",
            routes.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(routes)
    }
}

/// Search API response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: Option<String>,
    poi: Option<Poi>,
    address: Option<Address>,
    position: Position,
}

#[derive(Debug, Deserialize)]
struct Poi {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    freeform_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Position {
    lat: f64,
    lon: f64,
}

impl SearchResponse {
    fn into_candidates(self) -> Vec<LocationCandidate> {
        self.results
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| {
                let address = result
                    .address
                    .and_then(|a| a.freeform_address)
                    .unwrap_or_default();
                let name = result
                    .poi
                    .map(|p| p.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| address.clone());
                let id = result.id.unwrap_or_else(|| format!("result-{index}"));
                let coordinates = Coordinates::new(result.position.lon, result.position.lat);

                let candidate = LocationCandidate::new(id, name, address, coordinates);
                if candidate.is_none() {
                    debug!("Dropping search result with invalid position");
                }
                candidate
            })
            .collect()
    }
}

/// Routing API response
#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    summary: Summary,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    length_in_meters: u64,
    travel_time_in_seconds: u64,
    #[serde(default)]
    traffic_delay_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    latitude: f64,
    longitude: f64,
}

impl RouteResponse {
    fn into_options(self) -> Vec<RouteOption> {
        self.routes
            .into_iter()
            .map(|route| RouteOption {
                length_in_meters: route.summary.length_in_meters,
                travel_time_in_seconds: route.summary.travel_time_in_seconds,
                traffic_delay_in_seconds: route.summary.traffic_delay_in_seconds,
                points: route
                    .legs
                    .into_iter()
                    .flat_map(|leg| leg.points)
                    .map(|p| Coordinates::new(p.longitude, p.latitude))
                    .collect(),
            })
            .collect()
    }
}
