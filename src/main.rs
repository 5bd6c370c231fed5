#![warn(clippy::all)]

//! Vector Map Viewer - a slippy map of vector tiles driven by the URL fragment.
//!
//! In the browser the map is Leaflet with a Tangram layer on top; the
//! fragment (`#source,lat,lng,zoom,options`) selects the tile source and
//! the view and is kept in sync as the map moves. Natively the same viewer
//! runs in an eframe window that outlines the tiles in view.

mod data;
mod error;
mod state;
mod viewer;

#[cfg(not(target_arch = "wasm32"))]
mod geo;
#[cfg(not(target_arch = "wasm32"))]
mod preview;

#[cfg(target_arch = "wasm32")]
mod web;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let mut config_path = None;
    let mut hash = String::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(std::path::PathBuf::from),
            _ => hash = arg,
        }
    }

    let config = state::ViewerConfig::load(config_path.as_deref());
    preview::run(config, hash)
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    web::run_when_loaded().map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}
