//! Static datasets: tile source descriptors and named locations.

pub mod locations;
pub mod sources;

pub use locations::{
    get_location, get_location_or_default, NamedLocation, DEFAULT_LOCATION, NAMED_LOCATIONS,
};
pub use sources::{TileSource, TileSourceRegistry, DEFAULT_SOURCE_ID};
