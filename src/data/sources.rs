//! Tile source descriptors.
//!
//! A tile source maps a short identifier (the first token of the URL
//! fragment) to the request URL template and the scene layer/style
//! definitions the rendering engine should load for it.

use crate::error::ViewerError;
use serde::{Deserialize, Serialize};

/// Identifier of the source used when the fragment names none (or an unknown one).
pub const DEFAULT_SOURCE_ID: &str = "nextzen";

/// A remote vector tile endpoint and the scene definitions that style it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// Short identifier used in the URL fragment (e.g. "nextzen")
    pub id: String,
    /// Request URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Layer definition file passed to the scene
    pub layers: String,
    /// Style definition file passed to the scene
    pub styles: String,
    /// Deepest zoom the endpoint serves tiles for
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default)]
    pub attribution: String,
}

fn default_max_zoom() -> u8 {
    16
}

impl TileSource {
    pub fn new(id: &str, url_template: &str, layers: &str, styles: &str) -> Self {
        Self {
            id: id.to_string(),
            url_template: url_template.to_string(),
            layers: layers.to_string(),
            styles: styles.to_string(),
            max_zoom: default_max_zoom(),
            attribution: String::new(),
        }
    }

    /// Checks that the URL template carries every tile placeholder.
    pub fn validate(&self) -> Result<(), ViewerError> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(ViewerError::InvalidTemplate {
                    source_id: self.id.clone(),
                    missing: placeholder,
                });
            }
        }
        Ok(())
    }

    /// Expands the URL template for a single tile.
    ///
    /// The rendering engine does this itself on the web; the native preview
    /// and the tile listing use it directly.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Data source type name understood by the scene, from the URL extension.
    pub fn data_type(&self) -> &'static str {
        let path = self.url_template.split('?').next().unwrap_or_default();
        if path.ends_with(".topojson") {
            "TopoJSON"
        } else if path.ends_with(".json") || path.ends_with(".geojson") {
            "GeoJSON"
        } else {
            "MVT"
        }
    }
}

/// Built-in tile sources, always available.
pub fn builtin_sources() -> Vec<TileSource> {
    vec![
        TileSource {
            attribution: "Tiles by Nextzen, data &copy; OpenStreetMap".to_string(),
            ..TileSource::new(
                "nextzen",
                "https://tile.nextzen.org/tilezen/vector/v1/512/all/{z}/{x}/{y}.mvt",
                "layers.yaml",
                "styles.yaml",
            )
        },
        TileSource {
            attribution: "Tiles by Mapzen, data &copy; OpenStreetMap".to_string(),
            max_zoom: 15,
            ..TileSource::new(
                "mapzen",
                "https://tile.mapzen.com/mapzen/vector/v1/all/{z}/{x}/{y}.topojson",
                "layers-topojson.yaml",
                "styles.yaml",
            )
        },
        TileSource {
            max_zoom: 14,
            ..TileSource::new(
                "local",
                "http://localhost:8080/{z}/{x}/{y}.mvt",
                "layers.yaml",
                "styles-debug.yaml",
            )
        },
    ]
}

/// Read-only lookup of tile sources by identifier.
#[derive(Debug, Clone)]
pub struct TileSourceRegistry {
    sources: Vec<TileSource>,
    default_id: String,
}

impl Default for TileSourceRegistry {
    fn default() -> Self {
        Self::new(builtin_sources(), DEFAULT_SOURCE_ID)
    }
}

impl TileSourceRegistry {
    /// Creates a registry. Sources with malformed templates are skipped.
    ///
    /// If `default_id` is not among the sources, the first source becomes
    /// the default.
    pub fn new(sources: Vec<TileSource>, default_id: &str) -> Self {
        let mut valid: Vec<TileSource> = Vec::with_capacity(sources.len());
        for source in sources {
            if let Err(e) = source.validate() {
                log::warn!("Skipping tile source: {}", e);
                continue;
            }
            // Later definitions replace earlier ones with the same id
            if let Some(existing) = valid.iter_mut().find(|s| s.id == source.id) {
                *existing = source;
            } else {
                valid.push(source);
            }
        }

        let default_id = if valid.iter().any(|s| s.id == default_id) {
            default_id.to_string()
        } else {
            let fallback = valid
                .first()
                .map(|s| s.id.clone())
                .unwrap_or_else(|| default_id.to_string());
            log::warn!(
                "Default tile source '{}' not defined, using '{}'",
                default_id,
                fallback
            );
            fallback
        };

        Self {
            sources: valid,
            default_id,
        }
    }

    /// Adds sources on top of the built-in set.
    pub fn with_extra(extra: Vec<TileSource>, default_id: &str) -> Self {
        let mut sources = builtin_sources();
        sources.extend(extra);
        Self::new(sources, default_id)
    }

    pub fn get(&self, id: &str) -> Option<&TileSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Returns the identifier itself if known, otherwise the default identifier.
    pub fn resolve_id<'a>(&'a self, id: &'a str) -> &'a str {
        if self.contains(id) {
            id
        } else {
            &self.default_id
        }
    }

    /// Returns the source for `id`, falling back to the default source.
    pub fn get_or_default(&self, id: &str) -> Option<&TileSource> {
        self.get(id).or_else(|| self.get(&self.default_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileSource> {
        self.sources.iter()
    }
}
