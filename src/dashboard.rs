//! Dashboard state: selected city, incident filters and refresh stamp.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::catalog;
use crate::map::MapView;
use crate::models::{City, CityStats, ConditionsSummary, DashboardFilterSet, Incident};
use crate::{Result, TrafficPulseError};

#[derive(Debug, Clone)]
pub struct DashboardState {
    city: &'static City,
    zoom: f64,
    filters: DashboardFilterSet,
    last_updated: DateTime<Utc>,
    refreshing: bool,
    refreshes: u64,
}

/// Serializable view of the whole dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub city: City,
    pub view: MapView,
    pub filters: DashboardFilterSet,
    pub last_updated: DateTime<Utc>,
    pub refreshing: bool,
    pub stats: CityStats,
    pub conditions: ConditionsSummary,
    pub incidents: Vec<Incident>,
}

impl DashboardState {
    /// Start on `city_id`, which must be a known city
    pub fn new(city_id: &str, zoom: f64) -> Result<Self> {
        Ok(Self {
            city: lookup_city(city_id)?,
            zoom,
            filters: DashboardFilterSet::new(),
            last_updated: Utc::now(),
            refreshing: false,
            refreshes: 0,
        })
    }

    pub fn city(&self) -> &'static City {
        self.city
    }

    pub fn filters(&self) -> &DashboardFilterSet {
        &self.filters
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Switch to another city; unknown ids leave the selection unchanged
    pub fn select_city(&mut self, id: &str) -> Result<&'static City> {
        let city = lookup_city(id)?;
        debug!("Dashboard city {} -> {}", self.city.id, city.id);
        self.city = city;
        Ok(city)
    }

    pub fn set_filters(&mut self, filters: DashboardFilterSet) {
        debug!("Dashboard filters set to {:?}", filters.tags());
        self.filters = filters;
    }

    /// Incidents passing the active filters, all of them when none are set
    pub fn visible_incidents(&self) -> Vec<&'static Incident> {
        self.filters.apply(catalog::incidents())
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            center: self.city.coordinates,
            zoom: self.zoom,
        }
    }

    pub fn begin_refresh(&mut self) {
        self.refreshing = true;
    }

    /// Re-stamp the last-updated time. Nothing is refetched.
    pub fn refresh(&mut self) -> DateTime<Utc> {
        self.last_updated = Utc::now();
        self.refreshing = false;
        self.refreshes += 1;
        self.last_updated
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            city: self.city.clone(),
            view: self.map_view(),
            filters: self.filters.clone(),
            last_updated: self.last_updated,
            refreshing: self.refreshing,
            stats: catalog::city_stats(&self.city.id),
            conditions: ConditionsSummary::for_city(self.city),
            incidents: self.visible_incidents().into_iter().cloned().collect(),
        }
    }
}

fn lookup_city(id: &str) -> Result<&'static City> {
    catalog::find_city(id)
        .ok_or_else(|| TrafficPulseError::validation(format!("Unknown city '{id}'")))
}

/// How long a manual refresh shows as in progress
pub const MANUAL_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Mark `state` as refreshing and re-stamp it after [`MANUAL_REFRESH_DELAY`].
///
/// Returns the snapshot taken while the refresh is in progress. A refresh
/// requested while one is pending joins it instead of starting another.
pub async fn start_manual_refresh(state: &Arc<RwLock<DashboardState>>) -> DashboardSnapshot {
    let mut dashboard = state.write().await;
    if !dashboard.refreshing {
        dashboard.begin_refresh();
        let state = Arc::clone(state);
        tokio::spawn(async move {
            tokio::time::sleep(MANUAL_REFRESH_DELAY).await;
            let stamp = state.write().await.refresh();
            debug!("Dashboard manually refreshed at {}", stamp);
        });
    }
    dashboard.snapshot()
}

/// Refresh `state` every `period` until the returned handle is aborted
pub fn spawn_auto_refresh(state: Arc<RwLock<DashboardState>>, period: Duration) -> JoinHandle<()> {
    info!("Auto refresh every {}s", period.as_secs());
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let stamp = state.write().await.refresh();
            debug!("Dashboard auto refreshed at {}", stamp);
        }
    })
}
