//! Outbound events and the per-sequencer event bus
//!
//! Collaborators (animation, audio, stats) subscribe to one sequencer's bus.
//! Nothing is global, so two sequencers never see each other's events.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::difficulty::Tier;

/// Event emitted by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreEvent {
    RouteStarted { route: usize },
    PadConfirmed { step: usize },
    /// Pad turned unstable and started its shake window
    PadWarning { step: usize },
    PadFailed { step: usize },
    RouteForwardComplete { route: usize },
    RouteReturnComplete { route: usize },
    DifficultySelected { tier: Tier },
    /// Reveal the tier selection
    SelectionRequested,
    ObstacleHit,
}

/// An event stamped with the session clock (seconds since the sequencer started)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time: f64,
    pub event: CoreEvent,
}

/// Observer registered on a bus
pub trait EventSink {
    fn on_event(&mut self, record: &EventRecord);
}

impl<T: EventSink> EventSink for Rc<RefCell<T>> {
    fn on_event(&mut self, record: &EventRecord) {
        self.borrow_mut().on_event(record);
    }
}

/// Sink that just keeps everything it sees
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub records: Vec<EventRecord>,
}

impl EventLog {
    pub fn events(&self) -> impl Iterator<Item = CoreEvent> + '_ {
        self.records.iter().map(|r| r.event)
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, record: &EventRecord) {
        self.records.push(*record);
    }
}

#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
    /// Emitted since the last drain
    pending: Vec<EventRecord>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.len())
            .field("pending", &self.pending)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Deliver to every sink in registration order, then queue for draining
    pub fn emit(&mut self, time: f64, event: CoreEvent) {
        let record = EventRecord { time, event };
        for sink in &mut self.sinks {
            sink.on_event(&record);
        }
        self.pending.push(record);
    }

    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_sink_sees_emitted_events() {
        let log = Rc::new(RefCell::new(EventLog::default()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(log.clone()));

        bus.emit(0.5, CoreEvent::RouteStarted { route: 0 });
        bus.emit(1.5, CoreEvent::PadConfirmed { step: 0 });

        let seen: Vec<_> = log.borrow().events().collect();
        assert_eq!(
            seen,
            vec![
                CoreEvent::RouteStarted { route: 0 },
                CoreEvent::PadConfirmed { step: 0 }
            ]
        );
        assert_eq!(log.borrow().records[1].time, 1.5);
    }

    #[test]
    fn test_drain_empties_pending() {
        let mut bus = EventBus::new();
        bus.emit(0.0, CoreEvent::ObstacleHit);
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_buses_are_isolated() {
        let log = Rc::new(RefCell::new(EventLog::default()));
        let mut first = EventBus::new();
        let mut second = EventBus::new();
        first.subscribe(Box::new(log.clone()));

        second.emit(0.0, CoreEvent::SelectionRequested);
        assert!(log.borrow().records.is_empty());
    }
}
