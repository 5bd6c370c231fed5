//! Typed events and subscriptions.
//!
//! Every signal the viewer reacts to (map widget, rendering layer, DOM) is
//! a [`MapEvent`]. Handlers subscribe to one [`EventKind`] each, so the
//! wiring can be listed and exercised without a browser.

use super::host::{PickTicket, PickedFeature};
use glam::Vec2;

/// Something that happened on the page, the map or the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The rendering layer finished loading its scene.
    Init,
    /// A pan or zoom finished.
    MoveEnd,
    /// The browser window changed size.
    Resize,
    /// The URL fragment was changed from outside the viewer.
    HashChange { hash: String },
    DragStart,
    DragEnd,
    /// The pointer moved over the map, in container pixels.
    PointerMove { position: Vec2 },
    /// The rendering layer is about to draw a frame.
    PreRender,
    /// The rendering layer finished drawing a frame.
    PostRender,
    /// Reply to a feature lookup started by a pointer move.
    FeaturePicked {
        ticket: PickTicket,
        position: Vec2,
        feature: Option<PickedFeature>,
    },
}

/// Discriminant of [`MapEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Init,
    MoveEnd,
    Resize,
    HashChange,
    DragStart,
    DragEnd,
    PointerMove,
    PreRender,
    PostRender,
    FeaturePicked,
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::Init => EventKind::Init,
            MapEvent::MoveEnd => EventKind::MoveEnd,
            MapEvent::Resize => EventKind::Resize,
            MapEvent::HashChange { .. } => EventKind::HashChange,
            MapEvent::DragStart => EventKind::DragStart,
            MapEvent::DragEnd => EventKind::DragEnd,
            MapEvent::PointerMove { .. } => EventKind::PointerMove,
            MapEvent::PreRender => EventKind::PreRender,
            MapEvent::PostRender => EventKind::PostRender,
            MapEvent::FeaturePicked { .. } => EventKind::FeaturePicked,
        }
    }
}

type Handler<C> = Box<dyn FnMut(&mut C, &MapEvent)>;

struct Subscription<C> {
    kind: EventKind,
    name: &'static str,
    handler: Handler<C>,
}

/// Ordered list of handlers keyed by event kind.
///
/// `C` is the context handed to every handler. Handlers for the same kind
/// run in subscription order.
pub struct EventBus<C> {
    subscriptions: Vec<Subscription<C>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, name: &'static str, handler: F)
    where
        F: FnMut(&mut C, &MapEvent) + 'static,
    {
        self.subscriptions.push(Subscription {
            kind,
            name,
            handler: Box::new(handler),
        });
    }

    /// Runs every handler subscribed to the event's kind.
    ///
    /// Returns the number of handlers that ran.
    pub fn dispatch(&mut self, ctx: &mut C, event: &MapEvent) -> usize {
        let kind = event.kind();
        let mut ran = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            (sub.handler)(ctx, event);
            ran += 1;
        }
        ran
    }

    /// (kind, handler name) for every subscription, in dispatch order.
    pub fn subscriptions(&self) -> Vec<(EventKind, &'static str)> {
        self.subscriptions.iter().map(|s| (s.kind, s.name)).collect()
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.iter().any(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_kind_in_order() {
        let mut bus: EventBus<Vec<&'static str>> = EventBus::new();
        bus.subscribe(EventKind::MoveEnd, "first", |log, _| log.push("first"));
        bus.subscribe(EventKind::Resize, "other", |log, _| log.push("other"));
        bus.subscribe(EventKind::MoveEnd, "second", |log, _| log.push("second"));

        let mut log = Vec::new();
        assert_eq!(bus.dispatch(&mut log, &MapEvent::MoveEnd), 2);
        assert_eq!(log, vec!["first", "second"]);

        assert_eq!(bus.dispatch(&mut log, &MapEvent::Init), 0);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_handler_sees_payload() {
        let mut bus: EventBus<Option<Vec2>> = EventBus::new();
        bus.subscribe(EventKind::PointerMove, "capture", |seen, event| {
            if let MapEvent::PointerMove { position } = event {
                *seen = Some(*position);
            }
        });

        let mut seen = None;
        bus.dispatch(
            &mut seen,
            &MapEvent::PointerMove {
                position: Vec2::new(3.0, 4.0),
            },
        );
        assert_eq!(seen, Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_subscription_listing() {
        let mut bus: EventBus<()> = EventBus::new();
        bus.subscribe(EventKind::Init, "ready", |_, _| {});
        assert_eq!(bus.subscriptions(), vec![(EventKind::Init, "ready")]);
        assert!(bus.is_subscribed(EventKind::Init));
        assert!(!bus.is_subscribed(EventKind::PostRender));
    }
}
