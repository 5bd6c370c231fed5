//! Viewer state: the persisted map view, its URL fragment encoding,
//! configuration and frame statistics.

mod options;
mod settings;
mod stats;
pub mod url_hash;
mod view;

pub use settings::ViewerConfig;
pub use stats::{FrameStats, RenderMetrics};
pub use view::MapViewState;
