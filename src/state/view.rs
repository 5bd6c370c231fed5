//! Current map view: center, zoom, active tile source and option flags.

use super::options::OptionFlags;
use crate::data::NamedLocation;
use geo_types::Coord;

/// Everything the URL fragment persists about the map.
///
/// `center` follows the `geo_types` convention: `x` is longitude, `y` is
/// latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    pub center: Coord<f64>,
    pub zoom: u8,
    pub source_id: String,
    pub options: OptionFlags,
}

impl MapViewState {
    pub fn new(source_id: &str, lat: f64, lng: f64, zoom: u8) -> Self {
        Self {
            center: Coord { x: lng, y: lat },
            zoom,
            source_id: source_id.to_string(),
            options: OptionFlags::new(),
        }
    }

    /// A view centered on a named location.
    pub fn at_location(source_id: &str, location: &NamedLocation) -> Self {
        Self::new(source_id, location.lat, location.lng, location.zoom)
    }

    pub fn with_options(mut self, options: OptionFlags) -> Self {
        self.options = options;
        self
    }

    pub fn lat(&self) -> f64 {
        self.center.y
    }

    pub fn lng(&self) -> f64 {
        self.center.x
    }
}
