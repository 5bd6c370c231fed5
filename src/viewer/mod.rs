//! Viewer wiring: bootstrap, shared context and event handlers.
//!
//! The [`Viewer`] owns an [`AppContext`] (map widget, rendering layer,
//! page, current view and overlay state) and an [`EventBus`] whose
//! handlers receive that context explicitly. Platform code feeds
//! [`MapEvent`]s into [`Viewer::handle`].

mod events;
mod handlers;
mod host;
#[cfg(any(target_arch = "wasm32", test))]
mod queue;

#[cfg(test)]
mod testing;

pub use events::{EventBus, EventKind, MapEvent};
pub use host::{MapWidget, PageHost, PickTicket, PickedFeature, RenderLayer, ViewportSize};
#[cfg(target_arch = "wasm32")]
pub use queue::EventQueue;

use crate::data::TileSourceRegistry;
use crate::state::{url_hash, FrameStats, MapViewState, ViewerConfig};

/// Everything the handlers operate on, constructed once at startup.
pub struct AppContext<M, L, P> {
    pub map: M,
    pub layer: L,
    pub page: P,

    pub config: ViewerConfig,
    pub registry: TileSourceRegistry,

    /// View as last applied or read back from the map
    pub view: MapViewState,

    /// Frame statistics (only sampled when the overlay is on)
    pub stats: FrameStats,

    /// Set once the rendering layer has reported `Init`
    pub layer_ready: bool,

    /// Whether the overlay was requested at startup
    pub overlay_enabled: bool,

    /// True between `DragStart` and `DragEnd`
    pub dragging: bool,

    /// Fragment most recently written, without `#`
    pub last_hash: String,

    next_ticket: u64,
    latest_pick: Option<PickTicket>,
}

impl<M, L, P> AppContext<M, L, P> {
    fn issue_ticket(&mut self) -> PickTicket {
        self.next_ticket += 1;
        PickTicket(self.next_ticket)
    }
}

/// A running map view plus its event subscriptions.
pub struct Viewer<M, L, P> {
    ctx: AppContext<M, L, P>,
    bus: EventBus<AppContext<M, L, P>>,
}

impl<M, L, P> Viewer<M, L, P>
where
    M: MapWidget + 'static,
    L: RenderLayer + 'static,
    P: PageHost + 'static,
{
    /// Resolves the initial view from the URL fragment, applies it, attaches
    /// the rendering layer and sizes the map to the viewport.
    pub fn bootstrap(config: ViewerConfig, mut map: M, mut layer: L, page: P) -> Self {
        let registry = config.registry();

        let hash = page.read_hash();
        let mut view = url_hash::parse_hash(&hash).resolve(&registry, &config.default_location);
        view.zoom = config.clamp_zoom(view.zoom);

        log::info!(
            "Starting map: source={}, center=({:.5}, {:.5}), zoom={}",
            view.source_id,
            view.lat(),
            view.lng(),
            view.zoom
        );

        if let Some(source) = registry.get_or_default(&view.source_id) {
            layer.set_source(source);
        } else {
            log::warn!("No tile sources available");
        }
        layer.set_render_mode(view.options.render_mode());
        map.set_view(view.center, view.zoom);

        let overlay_enabled = view.options.perf();

        let mut ctx = AppContext {
            map,
            layer,
            page,
            config,
            registry,
            view,
            stats: FrameStats::new(),
            layer_ready: false,
            overlay_enabled,
            dragging: false,
            last_hash: String::new(),
            next_ticket: 0,
            latest_pick: None,
        };

        let bus = Self::subscribe_handlers(overlay_enabled);
        log::debug!("Event handlers: {:?}", bus.subscriptions());

        ctx.layer.attach();
        handlers::resize_map(&mut ctx, &MapEvent::Resize);

        if overlay_enabled {
            let offset = ctx.config.stats_panel_offset;
            ctx.page.show_stats_panel(offset);
        }

        Self { ctx, bus }
    }

    fn subscribe_handlers(overlay_enabled: bool) -> EventBus<AppContext<M, L, P>> {
        let mut bus = EventBus::new();

        bus.subscribe(EventKind::Init, "layer-ready", handlers::mark_ready::<M, L, P>);
        bus.subscribe(EventKind::Init, "url-sync", handlers::sync_hash::<M, L, P>);
        bus.subscribe(EventKind::MoveEnd, "url-sync", handlers::sync_hash::<M, L, P>);
        bus.subscribe(EventKind::HashChange, "url-follow", handlers::follow_hash::<M, L, P>);
        bus.subscribe(EventKind::Resize, "resize", handlers::resize_map::<M, L, P>);
        bus.subscribe(EventKind::DragStart, "drag", handlers::track_drag::<M, L, P>);
        bus.subscribe(EventKind::DragEnd, "drag", handlers::track_drag::<M, L, P>);
        bus.subscribe(EventKind::PointerMove, "feature-pick", handlers::pick_feature::<M, L, P>);
        bus.subscribe(
            EventKind::FeaturePicked,
            "feature-label",
            handlers::show_picked_feature::<M, L, P>,
        );

        if overlay_enabled {
            bus.subscribe(EventKind::PreRender, "stats", handlers::sample_pre_render::<M, L, P>);
            bus.subscribe(EventKind::PostRender, "stats", handlers::sample_post_render::<M, L, P>);
        }

        bus
    }

    /// Dispatches one event to its subscribers.
    pub fn handle(&mut self, event: &MapEvent) {
        if self.bus.dispatch(&mut self.ctx, event) == 0 {
            log::trace!("No handler for {:?}", event.kind());
        }
    }

    /// Switches the active tile source. Unknown ids select the default source.
    pub fn set_source(&mut self, source_id: &str) {
        handlers::switch_source(&mut self.ctx, source_id);
        handlers::sync_hash(&mut self.ctx, &MapEvent::MoveEnd);
    }

    pub fn context(&self) -> &AppContext<M, L, P> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext<M, L, P> {
        &mut self.ctx
    }

    /// Whether any handler listens for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.bus.is_subscribed(kind)
    }
}
