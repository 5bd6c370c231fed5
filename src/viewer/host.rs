//! Platform seams: the map widget, the rendering layer and the page.
//!
//! On the web these are Leaflet, Tangram and the DOM; the native preview
//! and the tests provide their own implementations.
//!
//! Note: These traits do not require `Send` since WASM is single-threaded
//! and JS handles cannot be sent between threads.

use crate::data::TileSource;
use crate::state::RenderMetrics;
use geo_types::Coord;
use glam::Vec2;
use serde::Deserialize;

/// Browser viewport (or window) size in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// CSS `width` value, e.g. `"1280px"`.
    pub fn css_width(&self) -> String {
        format!("{}px", self.width)
    }

    /// CSS `height` value, e.g. `"720px"`.
    pub fn css_height(&self) -> String {
        format!("{}px", self.height)
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Identifies one feature lookup. Later lookups carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PickTicket(pub u64);

/// A feature returned by the rendering engine's pixel lookup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PickedFeature {
    /// Tile data layer the feature came from (e.g. "roads").
    #[serde(default)]
    pub source_layer: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl PickedFeature {
    pub fn named(name: &str) -> Self {
        let mut properties = serde_json::Map::new();
        properties.insert("name".to_string(), serde_json::Value::from(name));
        Self {
            source_layer: None,
            properties,
        }
    }

    /// The `name` property, if present and not blank.
    pub fn name(&self) -> Option<&str> {
        self.properties
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The interactive map: owns the viewport center and zoom.
pub trait MapWidget {
    /// Moves the map without animation. Implementations clamp `zoom` to
    /// their own range.
    fn set_view(&mut self, center: Coord<f64>, zoom: u8);

    fn center(&self) -> Coord<f64>;

    fn zoom(&self) -> u8;

    /// Recomputes the layout after the container changed size.
    fn invalidate_size(&mut self, animate: bool);
}

/// The vector-tile rendering layer drawn on top of the map.
pub trait RenderLayer {
    /// Points the layer at a tile source. May be called before or after
    /// [`attach`](Self::attach).
    fn set_source(&mut self, source: &TileSource);

    /// Selects a named render mode, or the scene default for `None`.
    fn set_render_mode(&mut self, mode: Option<&str>);

    /// Adds the layer to the map. Loading is asynchronous; the layer
    /// reports readiness with [`MapEvent::Init`](super::MapEvent::Init).
    fn attach(&mut self);

    /// Counters for the frame that was just drawn.
    fn metrics(&self) -> RenderMetrics;

    /// Starts a lookup of the topmost feature under `position`. The answer
    /// arrives as [`MapEvent::FeaturePicked`](super::MapEvent::FeaturePicked)
    /// carrying the same ticket.
    fn query_feature_at(&mut self, position: Vec2, ticket: PickTicket);
}

/// The hosting page: viewport, URL fragment and overlay elements.
pub trait PageHost {
    fn viewport_size(&self) -> ViewportSize;

    /// Sets the map container's width/height styles.
    fn set_container_size(&mut self, size: ViewportSize);

    /// The URL fragment, with or without a leading `#`.
    fn read_hash(&self) -> String;

    /// Replaces the URL fragment (without the leading `#`).
    fn write_hash(&mut self, hash: &str);

    /// Shows (or moves) the floating feature label.
    fn show_label(&mut self, text: &str, position: Vec2);

    /// Removes the feature label, if any.
    fn remove_label(&mut self);

    /// Creates the statistics panel `top_offset` pixels from the top.
    fn show_stats_panel(&mut self, top_offset: f32);

    fn update_stats_panel(&mut self, lines: &[String]);
}
