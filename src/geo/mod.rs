//! Web Mercator projection and slippy-map tile addressing.

mod projection;
mod tiles;

pub use projection::{world_size, MapProjection, TILE_SIZE};
pub use tiles::{tile_for, tiles_for_view, TileCoord};
