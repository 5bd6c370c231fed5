//! In-memory map, layer and page used by the viewer tests.

use super::{MapWidget, PageHost, PickTicket, RenderLayer, Viewer, ViewportSize};
use crate::data::TileSource;
use crate::state::{RenderMetrics, ViewerConfig};
use geo_types::Coord;
use glam::Vec2;

pub struct FakeMap {
    pub center: Coord<f64>,
    pub zoom: u8,
    pub max_zoom: u8,
    pub set_view_calls: usize,
    pub invalidations: Vec<bool>,
}

impl Default for FakeMap {
    fn default() -> Self {
        Self {
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 0,
            max_zoom: 20,
            set_view_calls: 0,
            invalidations: Vec::new(),
        }
    }
}

impl MapWidget for FakeMap {
    fn set_view(&mut self, center: Coord<f64>, zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(self.max_zoom);
        self.set_view_calls += 1;
    }

    fn center(&self) -> Coord<f64> {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn invalidate_size(&mut self, animate: bool) {
        self.invalidations.push(animate);
    }
}

#[derive(Default)]
pub struct FakeLayer {
    pub source: Option<TileSource>,
    pub render_mode: Option<String>,
    pub attached: bool,
    pub metrics: RenderMetrics,
    pub queries: Vec<(Vec2, PickTicket)>,
}

impl RenderLayer for FakeLayer {
    fn set_source(&mut self, source: &TileSource) {
        self.source = Some(source.clone());
    }

    fn set_render_mode(&mut self, mode: Option<&str>) {
        self.render_mode = mode.map(str::to_string);
    }

    fn attach(&mut self) {
        self.attached = true;
    }

    fn metrics(&self) -> RenderMetrics {
        self.metrics
    }

    fn query_feature_at(&mut self, position: Vec2, ticket: PickTicket) {
        self.queries.push((position, ticket));
    }
}

pub struct FakePage {
    pub viewport: ViewportSize,
    pub hash: String,
    pub hash_writes: Vec<String>,
    pub container_width: Option<String>,
    pub container_height: Option<String>,
    pub label: Option<(String, Vec2)>,
    pub stats_panel: Option<f32>,
    pub stats_lines: Vec<String>,
}

impl FakePage {
    pub fn with_hash(hash: &str) -> Self {
        Self {
            viewport: ViewportSize::new(1024, 768),
            hash: hash.to_string(),
            hash_writes: Vec::new(),
            container_width: None,
            container_height: None,
            label: None,
            stats_panel: None,
            stats_lines: Vec::new(),
        }
    }
}

impl PageHost for FakePage {
    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn set_container_size(&mut self, size: ViewportSize) {
        self.container_width = Some(size.css_width());
        self.container_height = Some(size.css_height());
    }

    fn read_hash(&self) -> String {
        self.hash.clone()
    }

    fn write_hash(&mut self, hash: &str) {
        self.hash = hash.to_string();
        self.hash_writes.push(hash.to_string());
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

pub type TestViewer = Viewer<FakeMap, FakeLayer, FakePage>;

pub fn viewer_with_config(config: ViewerConfig, hash: &str) -> TestViewer {
    Viewer::bootstrap(
        config,
        FakeMap::default(),
        FakeLayer::default(),
        FakePage::with_hash(hash),
    )
}

pub fn viewer_with_hash(hash: &str) -> TestViewer {
    viewer_with_config(ViewerConfig::default(), hash)
}
