//! Viewer configuration.
//!
//! On the web the page may embed a JSON object in
//! `<script type="application/json" id="viewer-config">`; natively a JSON
//! file can be passed on the command line. Missing fields take defaults.

use crate::data::{TileSource, TileSourceRegistry, DEFAULT_LOCATION, DEFAULT_SOURCE_ID};
use crate::error::ViewerError;
use serde::{Deserialize, Serialize};

/// Startup settings for the map, the rendering layer and the overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Id of the element that hosts the map.
    pub container_id: String,
    /// Scene file handed to the rendering engine.
    pub scene_file: String,
    pub default_source: String,
    pub default_location: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Fraction of a zoom level applied per keyboard zoom step.
    pub keyboard_zoom_offset: f64,
    /// Worker threads the rendering engine may spawn.
    pub worker_count: u8,
    pub attribution: String,
    /// Distance from the top of the page to the stats panel, clear of the
    /// zoom controls.
    pub stats_panel_offset: f32,
    /// Offset of the hover label from the cursor, in pixels.
    pub label_offset: [f32; 2],
    /// Sources added to (or overriding) the built-in set.
    pub sources: Vec<TileSource>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            scene_file: "scene.yaml".to_string(),
            default_source: DEFAULT_SOURCE_ID.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            min_zoom: 0,
            max_zoom: 20,
            keyboard_zoom_offset: 0.05,
            worker_count: 2,
            attribution: "Map data &copy; OpenStreetMap".to_string(),
            stats_panel_offset: 80.0,
            label_offset: [12.0, -12.0],
            sources: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Element id of the embedded JSON config.
    #[cfg(target_arch = "wasm32")]
    pub const ELEMENT_ID: &'static str = "viewer-config";

    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let mut config: ViewerConfig = serde_json::from_str(json)?;
        if config.min_zoom > config.max_zoom {
            log::warn!(
                "min_zoom {} is above max_zoom {}, swapping",
                config.min_zoom,
                config.max_zoom
            );
            std::mem::swap(&mut config.min_zoom, &mut config.max_zoom);
        }
        Ok(config)
    }

    /// Builds the source registry from the built-ins plus configured sources.
    pub fn registry(&self) -> TileSourceRegistry {
        TileSourceRegistry::with_extra(self.sources.clone(), &self.default_source)
    }

    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Load the config embedded in the page, or defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        let Some(json) = text else {
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded viewer config from #{}", Self::ELEMENT_ID);
                config
            }
            Err(e) => {
                log::warn!("Failed to parse viewer config: {}", e);
                Self::default()
            }
        }
    }

    /// Load the config from a JSON file, or defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: Option<&std::path::Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let json = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded viewer config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse viewer config: {}", e);
                Self::default()
            }
        }
    }
}
