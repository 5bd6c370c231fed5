//! The hosting page: viewport size, map container styles, URL fragment and
//! the two overlay elements (hover label and statistics panel).

use crate::error::ViewerError;
use crate::state::url_hash;
use crate::viewer::{PageHost, ViewportSize};
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

const LABEL_CLASS: &str = "feature-label";
const STATS_CLASS: &str = "stats-panel";

pub struct DomPage {
    window: Window,
    document: Document,
    container: HtmlElement,
    label: Option<HtmlElement>,
    stats_panel: Option<HtmlElement>,
}

impl DomPage {
    pub fn new(container_id: &str) -> Result<Self, ViewerError> {
        let window =
            web_sys::window().ok_or_else(|| ViewerError::Js("No window object".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ViewerError::Js("No document".into()))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| ViewerError::MissingElement(container_id.to_string()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| {
                ViewerError::Js(format!("#{} is not an HTML element", container_id))
            })?;

        Ok(Self {
            window,
            document,
            container,
            label: None,
            stats_panel: None,
        })
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    fn create_overlay(&self, class: &str) -> Result<HtmlElement, ViewerError> {
        let element = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| ViewerError::Js("div is not an HTML element".into()))?;
        element.set_class_name(class);
        element.style().set_property("position", "absolute")?;
        Ok(element)
    }

    fn place_label(&mut self, text: &str, position: Vec2) -> Result<(), ViewerError> {
        let label = match &self.label {
            Some(label) => label.clone(),
            None => {
                let label = self.create_overlay(LABEL_CLASS)?;
                let style = label.style();
                style.set_property("pointer-events", "none")?;
                // Above Leaflet's panes (400), below its controls (800)
                style.set_property("z-index", "700")?;
                self.container.append_child(&label)?;
                self.label = Some(label.clone());
                label
            }
        };
        label.set_text_content(Some(text));
        let style = label.style();
        style.set_property("left", &format!("{}px", position.x))?;
        style.set_property("top", &format!("{}px", position.y))?;
        Ok(())
    }

    fn create_stats_panel(&mut self, top_offset: f32) -> Result<(), ViewerError> {
        if self.stats_panel.is_some() {
            return Ok(());
        }
        let panel = self.create_overlay(STATS_CLASS)?;
        let style = panel.style();
        style.set_property("top", &format!("{}px", top_offset))?;
        style.set_property("left", "10px")?;
        style.set_property("z-index", "1000")?;
        style.set_property("white-space", "pre")?;
        self.container.append_child(&panel)?;
        self.stats_panel = Some(panel);
        Ok(())
    }
}

impl PageHost for DomPage {
    fn viewport_size(&self) -> ViewportSize {
        let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            value
                .ok()
                .and_then(|v| v.as_f64())
                .map(|v| v.max(0.0) as u32)
                .unwrap_or(0)
        };
        ViewportSize::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn set_container_size(&mut self, size: ViewportSize) {
        let style = self.container.style();
        if let Err(e) = style
            .set_property("width", &size.css_width())
            .and_then(|_| style.set_property("height", &size.css_height()))
        {
            log::warn!("Failed to size map container: {:?}", e);
        }
    }

    fn read_hash(&self) -> String {
        url_hash::read_from_location()
    }

    fn write_hash(&mut self, hash: &str) {
        if let Err(e) = url_hash::write_to_location(hash) {
            log::warn!("Failed to update URL: {}", e);
        }
    }

    fn show_label(&mut self, text: &str, position: Vec2) {
        if let Err(e) = self.place_label(text, position) {
            log::warn!("Failed to show feature label: {}", e);
        }
    }

    fn remove_label(&mut self) {
        if let Some(label) = self.label.take() {
            label.remove();
        }
    }

    fn show_stats_panel(&mut self, top_offset: f32) {
        if let Err(e) = self.create_stats_panel(top_offset) {
            log::warn!("Failed to create stats panel: {}", e);
        }
    }

    fn update_stats_panel(&mut self, lines: &[String]) {
        if let Some(panel) = &self.stats_panel {
            panel.set_text_content(Some(&lines.join("\n")));
        }
    }
}
