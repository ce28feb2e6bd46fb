//! JSON API consumed by the dashboard frontend.

mod ws;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog;
use crate::config::TrafficPulseConfig;
use crate::dashboard::{DashboardSnapshot, DashboardState, start_manual_refresh};
use crate::map::{MapRenderer, MapScene, SceneSurface};
use crate::models::{City, DashboardFilterSet, Incident, LocationCandidate, PlannedRoute};
use crate::provider::{Geocoder, RouteProvider};
use crate::routing::RouteRequester;
use crate::suggest::suggest_once;
use crate::tomtom::TomTomClient;
use crate::{Result, TrafficPulseError};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    config: Arc<TrafficPulseConfig>,
    geocoder: Option<Arc<dyn Geocoder>>,
    router: Option<Arc<dyn RouteProvider>>,
    dashboard: Arc<RwLock<DashboardState>>,
}

impl AppState {
    pub fn new(
        config: TrafficPulseConfig,
        geocoder: Option<Arc<dyn Geocoder>>,
        router: Option<Arc<dyn RouteProvider>>,
    ) -> Result<Self> {
        let dashboard = DashboardState::new(&config.dashboard.default_city, config.map.default_zoom)?;
        Ok(Self {
            config: Arc::new(config),
            geocoder,
            router,
            dashboard: Arc::new(RwLock::new(dashboard)),
        })
    }

    /// Use TomTom for lookups when an API key is configured
    pub fn from_config(config: TrafficPulseConfig) -> Result<Self> {
        if !config.is_configured() {
            info!("No TomTom API key configured, route planning and suggestions disabled");
            return Self::new(config, None, None);
        }
        let client = Arc::new(TomTomClient::new(&config.tomtom)?);
        let geocoder: Arc<dyn Geocoder> = client.clone();
        let router: Arc<dyn RouteProvider> = client;
        Self::new(config, Some(geocoder), Some(router))
    }

    pub fn config(&self) -> &TrafficPulseConfig {
        &self.config
    }

    pub fn dashboard(&self) -> Arc<RwLock<DashboardState>> {
        Arc::clone(&self.dashboard)
    }

    fn geocoder(&self) -> Result<Arc<dyn Geocoder>> {
        self.geocoder.clone().ok_or(TrafficPulseError::NotConfigured)
    }

    fn router(&self) -> Result<Arc<dyn RouteProvider>> {
        self.router.clone().ok_or(TrafficPulseError::NotConfigured)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/cities", get(get_cities))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/city", put(select_city))
        .route("/dashboard/filters", put(set_filters))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .route("/incidents", get(get_incidents))
        .route("/suggestions", get(get_suggestions))
        .route("/suggestions/ws", get(ws::suggestions_ws))
        .route("/route", post(calculate_route))
        .with_state(state)
}

#[derive(Serialize)]
struct StatusResponse {
    name: &'static str,
    version: &'static str,
    configured: bool,
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        name: env!("CARGO_PKG_NAME"),
        version: crate::VERSION,
        configured: state.geocoder.is_some() && state.router.is_some(),
    })
}

async fn get_cities() -> Json<&'static [City]> {
    Json(catalog::cities())
}

async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.read().await.snapshot())
}

#[derive(Deserialize)]
struct SelectCityRequest {
    city: String,
}

async fn select_city(
    State(state): State<AppState>,
    Json(request): Json<SelectCityRequest>,
) -> Result<Json<DashboardSnapshot>> {
    let mut dashboard = state.dashboard.write().await;
    dashboard.select_city(&request.city)?;
    Ok(Json(dashboard.snapshot()))
}

#[derive(Deserialize)]
struct FiltersRequest {
    filters: Vec<String>,
}

async fn set_filters(
    State(state): State<AppState>,
    Json(request): Json<FiltersRequest>,
) -> Result<Json<DashboardSnapshot>> {
    let filters = DashboardFilterSet::parse(&request.filters)?;
    let mut dashboard = state.dashboard.write().await;
    dashboard.set_filters(filters);
    Ok(Json(dashboard.snapshot()))
}

async fn refresh_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(start_manual_refresh(&state.dashboard).await)
}

#[derive(Deserialize)]
struct IncidentsQuery {
    /// Comma separated filter tags; the dashboard filters when absent
    filters: Option<String>,
}

async fn get_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentsQuery>,
) -> Result<Json<Vec<Incident>>> {
    let filters = match query.filters {
        Some(tags) => DashboardFilterSet::parse(tags.split(','))?,
        None => state.dashboard.read().await.filters().clone(),
    };
    Ok(Json(
        filters
            .apply(catalog::incidents())
            .into_iter()
            .cloned()
            .collect(),
    ))
}

#[derive(Deserialize)]
struct SuggestionsQuery {
    #[serde(default)]
    q: String,
}

async fn get_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<LocationCandidate>>> {
    let geocoder = state.geocoder()?;
    Ok(Json(
        suggest_once(geocoder.as_ref(), &state.config.suggestions, &query.q).await,
    ))
}

#[derive(Deserialize)]
struct RouteRequest {
    origin: String,
    destination: String,
}

#[derive(Serialize)]
struct RouteResponse {
    route: PlannedRoute,
    /// Map of the selected city with the route drawn
    scene: MapScene,
}

async fn calculate_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>> {
    let requester = RouteRequester::new(state.geocoder()?, state.router()?);
    let route = requester
        .calculate(&request.origin, &request.destination)
        .await?;

    let view = state.dashboard.read().await.map_view();
    let mut renderer = MapRenderer::mount(SceneSurface::new(), view, &state.config.map);
    renderer.draw_route(&route);
    let scene = renderer.surface().scene().clone();
    renderer.unmount();

    Ok(Json(RouteResponse { route, scene }))
}
