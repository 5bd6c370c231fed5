//! Native preview window.
//!
//! Runs the same [`Viewer`] as the browser build against an egui canvas:
//! the address bar plays the URL fragment, the canvas plays the map and
//! outlines the tiles the active source would be asked for.

mod backend;
mod canvas;
mod top_bar;

use crate::state::ViewerConfig;
use crate::viewer::{MapEvent, Viewer};
use backend::{CanvasMap, LayerEvents, PreviewLayer, PreviewPage};
use eframe::egui;

type PreviewViewer = Viewer<CanvasMap, PreviewLayer, PreviewPage>;

/// Something the user asked for from the top bar.
pub enum TopBarAction {
    /// Navigate to an edited fragment
    Navigate(String),
    SelectSource(String),
}

pub struct PreviewApp {
    viewer: PreviewViewer,
    events: LayerEvents,

    /// Contents of the address bar while it is being edited
    address: String,

    /// Last pointer position over the canvas, in canvas pixels
    last_pointer: Option<glam::Vec2>,

    /// Scroll distance not yet turned into zoom steps
    scroll_accum: f32,
}

impl PreviewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig, hash: &str) -> Self {
        let events = LayerEvents::new();
        let map = CanvasMap::new(config.min_zoom, config.max_zoom);
        let layer = PreviewLayer::new(events.sender());
        let page = PreviewPage::with_hash(hash);

        let viewer = Viewer::bootstrap(config, map, layer, page);
        let address = viewer.context().page.hash.clone();

        let mut app = Self {
            viewer,
            events,
            address,
            last_pointer: None,
            scroll_accum: 0.0,
        };
        app.pump();
        app
    }

    /// Hands one event to the viewer, then everything it caused.
    fn dispatch(&mut self, event: MapEvent) {
        self.viewer.handle(&event);
        self.pump();
    }

    /// Delivers follow-up events: `MoveEnd` after the viewer moved the map,
    /// layout after a resize, and whatever the layer reported.
    fn pump(&mut self) {
        loop {
            let ctx = self.viewer.context_mut();
            if ctx.map.take_invalidated() {
                ctx.map.projection.viewport = ctx.page.container.as_vec2();
            }
            if ctx.map.take_moved() {
                self.viewer.handle(&MapEvent::MoveEnd);
                continue;
            }
            match self.events.try_recv() {
                Some(event) => self.viewer.handle(&event),
                None => break,
            }
        }
    }

    fn apply(&mut self, action: TopBarAction) {
        match action {
            TopBarAction::Navigate(text) => {
                let hash = text.trim().trim_start_matches('#').to_string();
                self.viewer.context_mut().page.hash = hash.clone();
                self.dispatch(MapEvent::HashChange { hash });
            }
            TopBarAction::SelectSource(id) => {
                self.viewer.set_source(&id);
                self.pump();
            }
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump();

        if let Some(action) = top_bar::render_top_bar(ctx, self) {
            self.apply(action);
        }

        canvas::render_canvas(ctx, self);

        self.pump();
        if self.viewer.context().overlay_enabled {
            ctx.request_repaint();
        }
    }
}

/// Opens the preview window.
pub fn run(config: ViewerConfig, hash: String) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Vector Map Viewer")
            .with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vector Map Viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(PreviewApp::new(cc, config, &hash)))),
    )
}
