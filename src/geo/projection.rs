//! Web Mercator projection and coordinate transformation.
//!
//! Converts between geographic coordinates (lat/lng), world pixels at a
//! given zoom, and screen pixels relative to a viewport centered on the
//! map center. This is the same pixel space slippy-map tiles live in.

use geo_types::Coord;
use glam::{DVec2, Vec2};

/// Edge length of one tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Width/height of the whole world in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Projects lat/lng (`x` = lng, `y` = lat) to world pixels at `zoom`.
pub fn project(coord: Coord<f64>, zoom: f64) -> DVec2 {
    let size = world_size(zoom);
    let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (coord.x + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    DVec2::new(x, y)
}

/// Inverse of [`project`].
pub fn unproject(point: DVec2, zoom: f64) -> Coord<f64> {
    let size = world_size(zoom);
    let lng = point.x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * point.y / size);
    let lat = n.sinh().atan().to_degrees();
    Coord { x: lng, y: lat }
}

/// Projection for a viewport of a given size centered on a map center.
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    pub center: Coord<f64>,
    pub zoom: u8,
    /// Viewport size in screen pixels
    pub viewport: Vec2,
}

impl MapProjection {
    pub fn new(center: Coord<f64>, zoom: u8, viewport: Vec2) -> Self {
        Self {
            center,
            zoom,
            viewport,
        }
    }

    fn center_world(&self) -> DVec2 {
        project(self.center, f64::from(self.zoom))
    }

    /// Converts geographic coordinates to a position in the viewport.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Vec2 {
        let world = project(coord, f64::from(self.zoom));
        let rel = world - self.center_world();
        self.viewport / 2.0 + rel.as_vec2()
    }

    /// Converts a position in the viewport to geographic coordinates.
    pub fn screen_to_geo(&self, pos: Vec2) -> Coord<f64> {
        let rel = (pos - self.viewport / 2.0).as_dvec2();
        unproject(self.center_world() + rel, f64::from(self.zoom))
    }

    /// World-pixel rectangle covered by the viewport, as (min, max).
    pub fn world_bounds(&self) -> (DVec2, DVec2) {
        let half = (self.viewport / 2.0).as_dvec2();
        let center = self.center_world();
        (center - half, center + half)
    }

    /// Moves the center so the map follows a drag of `delta` screen pixels.
    pub fn pan_by_pixels(&mut self, delta: Vec2) {
        let world = self.center_world() - delta.as_dvec2();
        self.center = unproject(world, f64::from(self.zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_origin_is_world_center() {
        let p = project(Coord { x: 0.0, y: 0.0 }, 0.0);
        assert!((p.x - 128.0).abs() < 1e-9);
        assert!((p.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let coord = Coord {
            x: -74.00976419448853,
            y: 40.70531887544228,
        };
        let back = unproject(project(coord, 15.0), 15.0);
        assert!((back.x - coord.x).abs() < 1e-9);
        assert!((back.y - coord.y).abs() < 1e-9);
    }

    #[test]
    fn test_center_maps_to_viewport_middle() {
        let projection = MapProjection::new(Coord { x: 2.35, y: 48.85 }, 12, Vec2::new(800.0, 600.0));
        let screen = projection.geo_to_screen(projection.center);
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_pan_moves_center_against_drag() {
        let mut projection = MapProjection::new(Coord { x: 0.0, y: 0.0 }, 3, Vec2::new(512.0, 512.0));
        projection.pan_by_pixels(Vec2::new(100.0, 0.0));
        // Dragging the map right reveals what is to the west
        assert!(projection.center.x < 0.0);
        assert!(projection.center.y.abs() < 1e-9);
    }
}
