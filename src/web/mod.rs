//! Browser backend: Leaflet as the map widget, Tangram as the rendering
//! layer, the DOM as the page.
//!
//! Every browser callback posts a [`MapEvent`] into one shared
//! [`EventQueue`]; the queue's sink is the [`Viewer`], so handlers never
//! run re-entrantly even when Leaflet fires `moveend` from inside
//! `setView`.

mod dom;
mod leaflet;

use crate::error::ViewerError;
use crate::state::{url_hash, ViewerConfig};
use crate::viewer::{EventQueue, MapEvent, Viewer};
use dom::DomPage;
use glam::Vec2;
use leaflet::{WebLayer, WebMap};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, MouseEvent};

/// Starts the viewer once the page has finished loading.
pub fn run_when_loaded() -> Result<(), ViewerError> {
    let window = web_sys::window().ok_or_else(|| ViewerError::Js("No window object".into()))?;
    let loaded = window
        .document()
        .and_then(|d| js_sys::Reflect::get(&d, &"readyState".into()).ok())
        .and_then(|state| state.as_string())
        .is_some_and(|state| state == "complete");

    if loaded {
        return run();
    }

    let on_load = Closure::once(move || {
        if let Err(e) = run() {
            log::error!("Failed to start viewer: {}", e);
        }
    });
    window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
    on_load.forget();
    Ok(())
}

/// Builds the map, the layer and the page, bootstraps the viewer and wires
/// the browser events to it.
pub fn run() -> Result<(), ViewerError> {
    let config = ViewerConfig::load();
    let queue = Rc::new(EventQueue::new());

    let page = DomPage::new(&config.container_id)?;
    let map = WebMap::new(&config)?;
    let leaflet = map.handle().clone();
    let layer = WebLayer::new(&config, leaflet.clone(), queue.clone());

    leaflet::forward_map_event(&leaflet, "moveend", &queue, MapEvent::MoveEnd);
    leaflet::forward_map_event(&leaflet, "dragstart", &queue, MapEvent::DragStart);
    leaflet::forward_map_event(&leaflet, "dragend", &queue, MapEvent::DragEnd);

    let container: EventTarget = page.container().clone().into();
    listen_pointer(&container, page.container().clone(), &queue)?;

    let window = web_sys::window().ok_or_else(|| ViewerError::Js("No window object".into()))?;
    listen(&window, "resize", &queue, |_| Some(MapEvent::Resize))?;
    listen(&window, "hashchange", &queue, |_| {
        Some(MapEvent::HashChange {
            hash: url_hash::read_from_location(),
        })
    })?;

    let mut viewer = Viewer::bootstrap(config, map, layer, page);
    queue.connect(Box::new(move |event: &MapEvent| viewer.handle(event)));

    log::info!("Viewer running");
    Ok(())
}

/// Posts the event built by `to_event` whenever `target` fires `name`.
fn listen<F>(
    target: &EventTarget,
    name: &str,
    queue: &Rc<EventQueue>,
    to_event: F,
) -> Result<(), ViewerError>
where
    F: Fn(&web_sys::Event) -> Option<MapEvent> + 'static,
{
    let queue = queue.clone();
    let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Some(event) = to_event(&event) {
            queue.post(event);
        }
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Mouse moves over the map, converted to container pixels.
fn listen_pointer(
    target: &EventTarget,
    container: web_sys::HtmlElement,
    queue: &Rc<EventQueue>,
) -> Result<(), ViewerError> {
    listen(target, "mousemove", queue, move |event| {
        let mouse = event.dyn_ref::<MouseEvent>()?;
        let rect = container.get_bounding_client_rect();
        Some(MapEvent::PointerMove {
            position: Vec2::new(
                (f64::from(mouse.client_x()) - rect.left()) as f32,
                (f64::from(mouse.client_y()) - rect.top()) as f32,
            ),
        })
    })
}
