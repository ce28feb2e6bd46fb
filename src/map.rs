//! Map rendering through an external map SDK.
//!
//! [`MapSurface`] is the imperative API of the SDK. [`MapRenderer`] owns one
//! surface for its whole lifetime: it is mounted with the traffic overlays
//! switched on and torn down exactly once, on [`MapRenderer::unmount`] or
//! when dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::MapConfig;
use crate::models::{Coordinates, PlannedRoute};

pub const ROUTE_LAYER_ID: &str = "route";
pub const START_MARKER_ID: &str = "route-start";
pub const END_MARKER_ID: &str = "route-end";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayKind {
    /// Road colouring relative to free-flow speed
    TrafficFlow,
    TrafficIncidents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStyle {
    Absolute,
    Relative,
}

/// A vendor traffic layer; refreshing is done by the SDK itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficOverlay {
    pub kind: OverlayKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FlowStyle>,
    pub refresh_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinates,
}

/// South-west / north-east corners of an area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl BoundingBox {
    /// Smallest box containing all points, `None` for no points
    pub fn from_points<I: IntoIterator<Item = Coordinates>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: Coordinates) {
        self.south_west.longitude = self.south_west.longitude.min(point.longitude);
        self.south_west.latitude = self.south_west.latitude.min(point.latitude);
        self.north_east.longitude = self.north_east.longitude.max(point.longitude);
        self.north_east.latitude = self.north_east.latitude.max(point.latitude);
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south_west.longitude..=self.north_east.longitude).contains(&point.longitude)
            && (self.south_west.latitude..=self.north_east.latitude).contains(&point.latitude)
    }
}

/// Imperative API of the map SDK
pub trait MapSurface {
    fn set_center(&mut self, center: Coordinates);
    fn set_zoom(&mut self, zoom: f64);
    fn add_traffic_overlay(&mut self, overlay: TrafficOverlay);
    fn add_marker(&mut self, id: &str, marker: Marker);
    fn remove_marker(&mut self, id: &str);
    /// Add or replace a line layer backed by a GeoJSON source
    fn set_line_layer(&mut self, id: &str, geojson: Value);
    fn remove_layer(&mut self, id: &str);
    fn fit_bounds(&mut self, bounds: BoundingBox, padding: u32);
    /// Release the map and every listener attached to it
    fn remove(&mut self);
}

/// GeoJSON `Feature` with a `LineString` geometry for a polyline
#[must_use]
pub fn line_feature(points: &[Coordinates]) -> Value {
    let coordinates: Vec<[f64; 2]> = points.iter().map(|&p| p.into()).collect();
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        }
    })
}

/// Owner of a mounted map surface
pub struct MapRenderer<S: MapSurface> {
    surface: S,
    padding: u32,
    has_route: bool,
    mounted: bool,
}

impl<S: MapSurface> MapRenderer<S> {
    /// Center the surface and switch on the traffic overlays
    pub fn mount(mut surface: S, view: MapView, config: &MapConfig) -> Self {
        surface.set_center(view.center);
        surface.set_zoom(view.zoom);
        let overlays = [
            (OverlayKind::TrafficFlow, Some(FlowStyle::Relative)),
            (OverlayKind::TrafficIncidents, None),
        ];
        for (kind, style) in overlays {
            surface.add_traffic_overlay(TrafficOverlay {
                kind,
                style,
                refresh_seconds: config.traffic_refresh_seconds,
            });
        }
        debug!("Mounted map at {} (zoom {})", view.center.format_coordinates(), view.zoom);

        Self {
            surface,
            padding: config.route_padding,
            has_route: false,
            mounted: true,
        }
    }

    pub fn update_view(&mut self, view: MapView) {
        self.surface.set_center(view.center);
        self.surface.set_zoom(view.zoom);
    }

    /// Draw a route, replacing the previous one, and fit the view to it
    pub fn draw_route(&mut self, route: &PlannedRoute) {
        self.clear_route();

        self.surface.add_marker(
            START_MARKER_ID,
            Marker {
                kind: MarkerKind::Start,
                position: route.origin,
            },
        );
        self.surface.add_marker(
            END_MARKER_ID,
            Marker {
                kind: MarkerKind::End,
                position: route.destination,
            },
        );
        self.surface
            .set_line_layer(ROUTE_LAYER_ID, line_feature(&route.points));
        self.has_route = true;

        let bounds = BoundingBox::from_points(
            route
                .points
                .iter()
                .copied()
                .chain([route.origin, route.destination]),
        );
        if let Some(bounds) = bounds {
            self.surface.fit_bounds(bounds, self.padding);
        }
        debug!("Drew route with {} points", route.points.len());
    }

    /// Remove the route markers and line, if any
    pub fn clear_route(&mut self) {
        if !self.has_route {
            return;
        }
        self.surface.remove_marker(START_MARKER_ID);
        self.surface.remove_marker(END_MARKER_ID);
        self.surface.remove_layer(ROUTE_LAYER_ID);
        self.has_route = false;
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear the map down now instead of on drop
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.clear_route();
        self.surface.remove();
        self.mounted = false;
        debug!("Map unmounted");
    }
}

impl<S: MapSurface> Drop for MapRenderer<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Everything the browser needs to draw a map with the vendor SDK
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub center: Option<Coordinates>,
    pub zoom: Option<f64>,
    pub overlays: Vec<TrafficOverlay>,
    pub markers: BTreeMap<String, Marker>,
    pub layers: BTreeMap<String, Value>,
    pub bounds: Option<BoundingBox>,
    pub padding: Option<u32>,
    pub removed: bool,
}

/// In-process surface that records the scene instead of drawing it.
///
/// Cloning shares nothing; the scene is plain data.
#[derive(Debug, Clone, Default)]
pub struct SceneSurface {
    scene: MapScene,
}

impl SceneSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scene(&self) -> &MapScene {
        &self.scene
    }
}

impl MapSurface for SceneSurface {
    fn set_center(&mut self, center: Coordinates) {
        self.scene.center = Some(center);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.scene.zoom = Some(zoom);
    }

    fn add_traffic_overlay(&mut self, overlay: TrafficOverlay) {
        self.scene.overlays.push(overlay);
    }

    fn add_marker(&mut self, id: &str, marker: Marker) {
        self.scene.markers.insert(id.to_string(), marker);
    }

    fn remove_marker(&mut self, id: &str) {
        self.scene.markers.remove(id);
    }

    fn set_line_layer(&mut self, id: &str, geojson: Value) {
        self.scene.layers.insert(id.to_string(), geojson);
    }

    fn remove_layer(&mut self, id: &str) {
        self.scene.layers.remove(id);
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding: u32) {
        self.scene.bounds = Some(bounds);
        self.scene.padding = Some(padding);
    }

    fn remove(&mut self) {
        self.scene.overlays.clear();
        self.scene.removed = true;
    }
}
