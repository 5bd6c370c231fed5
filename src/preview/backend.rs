//! In-window stand-ins for the map widget, the rendering layer and the page.
//!
//! The layer draws no vector data: it lists the slippy tiles of the
//! current view and treats the named locations as its pickable features.

use crate::data::{TileSource, NAMED_LOCATIONS};
use crate::geo::{tiles_for_view, MapProjection, TileCoord};
use crate::state::RenderMetrics;
use crate::viewer::{
    MapEvent, MapWidget, PageHost, PickTicket, PickedFeature, RenderLayer, ViewportSize,
};
use geo_types::Coord;
use glam::Vec2;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Screen distance within which a location counts as under the pointer.
const PICK_RADIUS: f32 = 8.0;

/// Source layer name reported for picked locations.
const PLACES_LAYER: &str = "places";

/// Carries events raised by the layer back to the UI loop.
///
/// The layer answers lookups and reports readiness through this channel,
/// the same way the browser layer answers asynchronously.
pub struct LayerEvents {
    sender: Sender<MapEvent>,
    receiver: Receiver<MapEvent>,
}

impl Default for LayerEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerEvents {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<MapEvent> {
        self.sender.clone()
    }

    /// Non-blocking receive of the next layer event.
    pub fn try_recv(&self) -> Option<MapEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Map widget drawn on an egui canvas.
pub struct CanvasMap {
    pub projection: MapProjection,
    min_zoom: u8,
    max_zoom: u8,
    moved: bool,
    invalidated: bool,
}

impl CanvasMap {
    pub fn new(min_zoom: u8, max_zoom: u8) -> Self {
        Self {
            projection: MapProjection::new(Coord { x: 0.0, y: 0.0 }, min_zoom, Vec2::ZERO),
            min_zoom,
            max_zoom,
            moved: false,
            invalidated: false,
        }
    }

    pub fn pan_by_pixels(&mut self, delta: Vec2) {
        self.projection.pan_by_pixels(delta);
    }

    /// Steps the zoom by `levels`, within the widget's range. Returns true
    /// if the zoom changed.
    pub fn zoom_by(&mut self, levels: i32) -> bool {
        let zoom = (i32::from(self.projection.zoom) + levels)
            .clamp(i32::from(self.min_zoom), i32::from(self.max_zoom)) as u8;
        let changed = zoom != self.projection.zoom;
        self.projection.zoom = zoom;
        changed
    }

    /// True once after every programmatic [`set_view`](MapWidget::set_view).
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }

    /// True once after every [`invalidate_size`](MapWidget::invalidate_size).
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }
}

impl MapWidget for CanvasMap {
    fn set_view(&mut self, center: Coord<f64>, zoom: u8) {
        self.projection.center = center;
        self.projection.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.moved = true;
    }

    fn center(&self) -> Coord<f64> {
        self.projection.center
    }

    fn zoom(&self) -> u8 {
        self.projection.zoom
    }

    fn invalidate_size(&mut self, _animate: bool) {
        self.invalidated = true;
    }
}

/// Tile-grid layer for the preview window.
pub struct PreviewLayer {
    pub source: Option<TileSource>,
    pub render_mode: Option<String>,
    attached: bool,
    view: Option<MapProjection>,
    events: Sender<MapEvent>,
}

impl PreviewLayer {
    pub fn new(events: Sender<MapEvent>) -> Self {
        Self {
            source: None,
            render_mode: None,
            attached: false,
            view: None,
            events,
        }
    }

    /// Records the view the next frame is drawn with.
    pub fn update_view(&mut self, projection: &MapProjection) {
        self.view = Some(projection.clone());
    }

    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        match (&self.view, self.attached) {
            (Some(view), true) => tiles_for_view(view),
            _ => Vec::new(),
        }
    }

    /// Named locations inside the viewport, with their screen positions.
    pub fn visible_places(&self) -> Vec<(&'static str, Vec2)> {
        let Some(view) = &self.view else {
            return Vec::new();
        };
        NAMED_LOCATIONS
            .iter()
            .map(|l| (l.name, view.geo_to_screen(Coord { x: l.lng, y: l.lat })))
            .filter(|(_, pos)| {
                pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= view.viewport.x && pos.y <= view.viewport.y
            })
            .collect()
    }

    fn send(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Layer event dropped, UI loop is gone");
        }
    }
}

impl RenderLayer for PreviewLayer {
    fn set_source(&mut self, source: &TileSource) {
        log::debug!("Preview layer source: {}", source.id);
        self.source = Some(source.clone());
    }

    fn set_render_mode(&mut self, mode: Option<&str>) {
        self.render_mode = mode.map(str::to_string);
    }

    fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.send(MapEvent::Init);
    }

    fn metrics(&self) -> RenderMetrics {
        RenderMetrics {
            tile_count: self.visible_tiles().len() as u32,
            buffer_bytes: 0,
            feature_count: self.visible_places().len() as u32,
        }
    }

    fn query_feature_at(&mut self, position: Vec2, ticket: PickTicket) {
        let feature = self
            .visible_places()
            .into_iter()
            .map(|(name, pos)| (name, pos.distance(position)))
            .filter(|(_, distance)| *distance <= PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| PickedFeature {
                source_layer: Some(PLACES_LAYER.to_string()),
                ..PickedFeature::named(name)
            });

        self.send(MapEvent::FeaturePicked {
            ticket,
            position,
            feature,
        });
    }
}

/// Window state standing in for the browser page.
#[derive(Default)]
pub struct PreviewPage {
    pub viewport: ViewportSize,
    pub container: ViewportSize,
    pub hash: String,
    pub label: Option<(String, Vec2)>,
    pub stats_panel: Option<f32>,
    pub stats_lines: Vec<String>,
}

impl PreviewPage {
    pub fn with_hash(hash: &str) -> Self {
        Self {
            hash: hash.trim_start_matches('#').to_string(),
            ..Self::default()
        }
    }
}

impl PageHost for PreviewPage {
    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn set_container_size(&mut self, size: ViewportSize) {
        self.container = size;
    }

    fn read_hash(&self) -> String {
        self.hash.clone()
    }

    fn write_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
    }

    fn show_label(&mut self, text: &str, position: Vec2) {
        self.label = Some((text.to_string(), position));
    }

    fn remove_label(&mut self) {
        self.label = None;
    }

    fn show_stats_panel(&mut self, top_offset: f32) {
        self.stats_panel = Some(top_offset);
    }

    fn update_stats_panel(&mut self, lines: &[String]) {
        self.stats_lines = lines.to_vec();
    }
}
