//! Slippy-map tile addressing.

use super::projection::{project, MapProjection, TILE_SIZE};
use geo_types::Coord;

/// A tile address in the `{z}/{x}/{y}` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along each axis at zoom `z`.
    pub fn tiles_per_axis(z: u8) -> u32 {
        1u32 << u32::from(z.min(31))
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// The tile containing `coord` at zoom `z`.
pub fn tile_for(coord: Coord<f64>, z: u8) -> TileCoord {
    let world = project(coord, f64::from(z));
    let max = TileCoord::tiles_per_axis(z) - 1;
    TileCoord {
        z,
        x: ((world.x / TILE_SIZE).floor().max(0.0) as u32).min(max),
        y: ((world.y / TILE_SIZE).floor().max(0.0) as u32).min(max),
    }
}

/// Every tile intersecting the viewport, row by row.
///
/// Columns wrap around the antimeridian; rows are clipped to the world.
pub fn tiles_for_view(projection: &MapProjection) -> Vec<TileCoord> {
    let z = projection.zoom;
    let n = i64::from(TileCoord::tiles_per_axis(z));
    let (min, max) = projection.world_bounds();

    let x0 = (min.x / TILE_SIZE).floor() as i64;
    let x1 = ((max.x / TILE_SIZE).ceil() as i64 - 1).max(x0);
    let y0 = ((min.y / TILE_SIZE).floor() as i64).max(0);
    let y1 = ((max.y / TILE_SIZE).ceil() as i64 - 1).min(n - 1);

    // Never list the same column twice when the viewport is wider than the world
    let x1 = x1.min(x0 + n - 1);

    let mut tiles = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            tiles.push(TileCoord {
                z,
                x: x.rem_euclid(n) as u32,
                y: y as u32,
            });
        }
    }
    tiles
}
