//! Event queue between platform callbacks and the viewer.

use super::events::MapEvent;
use std::cell::RefCell;
use std::collections::VecDeque;

type Sink = Box<dyn FnMut(&MapEvent)>;

/// FIFO between platform callbacks and the viewer.
///
/// Callbacks [`post`](Self::post) events; the connected sink handles them
/// in order. An event posted while the sink is running (a handler moved the
/// map and the widget fired `moveend` synchronously) is queued and handled
/// by the running drain loop once the current handler returns. Events
/// posted before [`connect`](Self::connect) wait in the queue.
#[derive(Default)]
pub struct EventQueue {
    pending: RefCell<VecDeque<MapEvent>>,
    sink: RefCell<Option<Sink>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, event: MapEvent) {
        self.pending.borrow_mut().push_back(event);
        self.drain();
    }

    pub fn connect(&self, sink: Sink) {
        log::debug!("Event sink connected, {} event(s) waiting", self.pending());
        *self.sink.borrow_mut() = Some(sink);
        self.drain();
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn drain(&self) {
        // Already draining further up the stack
        let Ok(mut sink) = self.sink.try_borrow_mut() else {
            return;
        };
        let Some(sink) = sink.as_mut() else {
            return;
        };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(event) => sink(&event),
                None => break,
            }
        }
    }
}
