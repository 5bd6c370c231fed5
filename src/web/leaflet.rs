//! Leaflet map widget and Tangram rendering layer, driven through their
//! JavaScript globals (`L` and `Tangram`).

use crate::data::TileSource;
use crate::error::ViewerError;
use crate::state::{RenderMetrics, ViewerConfig};
use crate::viewer::{EventQueue, MapEvent, MapWidget, PickTicket, PickedFeature, RenderLayer};
use geo_types::Coord;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    /// `L.Map`
    #[derive(Clone)]
    pub type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map, catch)]
    fn create_map(container_id: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64, options: &JsValue);

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &LeafletMap) -> LatLng;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &LeafletMap) -> f64;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    fn invalidate_size(this: &LeafletMap, animate: bool);

    #[wasm_bindgen(method, js_name = on)]
    fn on_map_event(this: &LeafletMap, event: &str, handler: &js_sys::Function);

    type LatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &LatLng) -> f64;
}

#[wasm_bindgen]
extern "C" {
    /// Layer returned by `Tangram.leafletLayer`
    type TangramLayer;

    #[wasm_bindgen(js_namespace = Tangram, js_name = leafletLayer, catch)]
    fn create_layer(options: &JsValue) -> Result<TangramLayer, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &TangramLayer, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer_event(this: &TangramLayer, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, getter)]
    fn scene(this: &TangramLayer) -> Option<Scene>;

    type Scene;

    #[wasm_bindgen(method, js_name = getFeatureAt)]
    fn get_feature_at(this: &Scene, pixel: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(method)]
    fn load(this: &Scene, config: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(method, getter)]
    fn tile_manager(this: &Scene) -> Option<TileManager>;

    type TileManager;

    #[wasm_bindgen(method, js_name = getRenderableTiles, catch)]
    fn get_renderable_tiles(this: &TileManager) -> Result<js_sys::Array, JsValue>;

    #[wasm_bindgen(method, js_name = getDebugSum, catch)]
    fn get_debug_sum(this: &TileManager, property: &str) -> Result<f64, JsValue>;
}

/// Converts a JSON value into a plain JS object.
fn to_js(value: &serde_json::Value) -> Result<JsValue, ViewerError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ViewerError::Js(e.to_string()))
}

/// Registers a no-argument callback that posts `event` for the page lifetime.
pub fn forward_map_event(map: &LeafletMap, name: &str, queue: &Rc<EventQueue>, event: MapEvent) {
    let queue = queue.clone();
    let callback = Closure::wrap(Box::new(move || {
        queue.post(event.clone());
    }) as Box<dyn FnMut()>);
    map.on_map_event(name, callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Leaflet `L.map` bound to the container element.
pub struct WebMap {
    map: LeafletMap,
    min_zoom: u8,
    max_zoom: u8,
}

impl WebMap {
    pub fn new(config: &ViewerConfig) -> Result<Self, ViewerError> {
        let options = to_js(&serde_json::json!({
            "keyboardZoomOffset": config.keyboard_zoom_offset,
            "minZoom": config.min_zoom,
            "maxZoom": config.max_zoom,
        }))?;
        let map = create_map(&config.container_id, &options)?;
        Ok(Self {
            map,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        })
    }

    pub fn handle(&self) -> &LeafletMap {
        &self.map
    }
}

impl MapWidget for WebMap {
    fn set_view(&mut self, center: Coord<f64>, zoom: u8) {
        let latlng = js_sys::Array::of2(&JsValue::from(center.y), &JsValue::from(center.x));
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let options = to_js(&serde_json::json!({ "animate": false })).unwrap_or(JsValue::UNDEFINED);
        self.map.set_view(&latlng, f64::from(zoom), &options);
    }

    fn center(&self) -> Coord<f64> {
        let center = self.map.get_center();
        Coord {
            x: center.lng(),
            y: center.lat(),
        }
    }

    fn zoom(&self) -> u8 {
        self.map.get_zoom().round().clamp(0.0, f64::from(u8::MAX)) as u8
    }

    fn invalidate_size(&mut self, animate: bool) {
        self.map.invalidate_size(animate);
    }
}

/// Shape of the `getFeatureAt` result.
#[derive(Deserialize)]
struct FeatureSelection {
    #[serde(default)]
    feature: Option<PickedFeature>,
}

/// Tangram layer drawing the active tile source on the Leaflet map.
pub struct WebLayer {
    map: LeafletMap,
    layer: Option<TangramLayer>,
    queue: Rc<EventQueue>,
    scene_file: String,
    attribution: String,
    worker_count: u8,
    source: Option<TileSource>,
    render_mode: Option<String>,
}

impl WebLayer {
    pub fn new(config: &ViewerConfig, map: LeafletMap, queue: Rc<EventQueue>) -> Self {
        Self {
            map,
            layer: None,
            queue,
            scene_file: config.scene_file.clone(),
            attribution: config.attribution.clone(),
            worker_count: config.worker_count,
            source: None,
            render_mode: None,
        }
    }

    /// Scene object: the base scene file plus the source's layer and style
    /// definitions, with the tile endpoint as the `tiles` data source.
    fn scene_config(&self) -> serde_json::Value {
        let mut imports = vec![self.scene_file.clone()];
        let mut sources = serde_json::Map::new();
        if let Some(source) = &self.source {
            imports.push(source.layers.clone());
            imports.push(source.styles.clone());
            sources.insert(
                "tiles".to_string(),
                serde_json::json!({
                    "type": source.data_type(),
                    "url": source.url_template,
                    "max_zoom": source.max_zoom,
                }),
            );
        }
        serde_json::json!({
            "import": imports,
            "sources": sources,
            "global": { "render_mode": self.render_mode },
        })
    }

    fn reload_scene(&self) {
        let Some(scene) = self.layer.as_ref().and_then(|l| l.scene()) else {
            return;
        };
        let config = match to_js(&self.scene_config()) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to build scene config: {}", e);
                return;
            }
        };
        let promise = scene.load(&config);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::error!("Scene reload failed: {:?}", e);
            }
        });
    }

    fn frame_hook(&self, event: MapEvent) -> Closure<dyn FnMut(JsValue)> {
        let queue = self.queue.clone();
        Closure::wrap(Box::new(move |will_render: JsValue| {
            if will_render.as_bool().unwrap_or(true) {
                queue.post(event.clone());
            }
        }) as Box<dyn FnMut(_)>)
    }

    fn try_attach(&mut self) -> Result<(), ViewerError> {
        let options = to_js(&serde_json::json!({
            "scene": self.scene_config(),
            "attribution": self.attribution,
            "numWorkers": self.worker_count,
        }))?;

        let pre_update = self.frame_hook(MapEvent::PreRender);
        let post_update = self.frame_hook(MapEvent::PostRender);
        js_sys::Reflect::set(&options, &"preUpdate".into(), pre_update.as_ref())?;
        js_sys::Reflect::set(&options, &"postUpdate".into(), post_update.as_ref())?;
        pre_update.forget();
        post_update.forget();

        let layer = create_layer(&options)?;

        let queue = self.queue.clone();
        let on_init = Closure::wrap(Box::new(move || {
            queue.post(MapEvent::Init);
        }) as Box<dyn FnMut()>);
        layer.on_layer_event("init", on_init.as_ref().unchecked_ref());
        on_init.forget();

        layer.add_to(&self.map);
        self.layer = Some(layer);
        Ok(())
    }
}

impl RenderLayer for WebLayer {
    fn set_source(&mut self, source: &TileSource) {
        self.source = Some(source.clone());
        self.reload_scene();
    }

    fn set_render_mode(&mut self, mode: Option<&str>) {
        self.render_mode = mode.map(str::to_string);
        self.reload_scene();
    }

    fn attach(&mut self) {
        if self.layer.is_some() {
            return;
        }
        match self.try_attach() {
            Ok(()) => log::info!("Tangram layer attached ({} workers)", self.worker_count),
            Err(e) => log::error!("Failed to attach Tangram layer: {}", e),
        }
    }

    fn metrics(&self) -> RenderMetrics {
        let Some(tiles) = self
            .layer
            .as_ref()
            .and_then(|l| l.scene())
            .and_then(|s| s.tile_manager())
        else {
            return RenderMetrics::default();
        };

        RenderMetrics {
            tile_count: tiles
                .get_renderable_tiles()
                .map(|a| a.length())
                .unwrap_or(0),
            buffer_bytes: tiles.get_debug_sum("buffer_size").unwrap_or(0.0).max(0.0) as u64,
            feature_count: tiles.get_debug_sum("features").unwrap_or(0.0).max(0.0) as u32,
        }
    }

    fn query_feature_at(&mut self, position: Vec2, ticket: PickTicket) {
        let Some(scene) = self.layer.as_ref().and_then(|l| l.scene()) else {
            return;
        };

        let pixel = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&pixel, &"x".into(), &JsValue::from(position.x));
        let _ = js_sys::Reflect::set(&pixel, &"y".into(), &JsValue::from(position.y));
        let promise = scene.get_feature_at(&pixel);

        let queue = self.queue.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let feature = match JsFuture::from(promise).await {
                Ok(selection) => serde_wasm_bindgen::from_value::<FeatureSelection>(selection)
                    .map_err(|e| log::debug!("Unreadable feature selection: {}", e))
                    .ok()
                    .and_then(|s| s.feature),
                Err(e) => {
                    log::debug!("Feature lookup failed: {:?}", e);
                    None
                }
            };
            queue.post(MapEvent::FeaturePicked {
                ticket,
                position,
                feature,
            });
        });
    }
}
