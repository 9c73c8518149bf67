//! Run Events
//!
//! Notifications produced by the simulation. Every event is delivered to the
//! attached listeners as it happens and kept in a log that the run drains
//! once per tick.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::game::catalog::PickupKind;
use crate::game::track::PickupId;

/// Sound effects requested by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AudioCue {
    /// A pickup was collected
    PickupCollected = 0,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunEventData {
    /// Score changed (truncated to an integer)
    ScoreUpdated {
        /// Current score
        score: i32,
    },

    /// Runner committed a turn
    HeadingChanged {
        /// New heading
        direction: Vec3,
    },

    /// Run ended
    GameOver {
        /// Score at death
        final_score: i32,
    },

    /// Runner touched a pickup
    PickupCollected {
        /// Consumed pickup
        pickup_id: PickupId,
        /// Its kind
        kind: PickupKind,
    },

    /// Sound to play
    AudioCue(AudioCue),
}

/// An event with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Tick when the event occurred
    pub tick: u32,

    /// Event data
    pub data: RunEventData,
}

impl RunEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: RunEventData) -> Self {
        Self { tick, data }
    }

    /// Check if this is the terminal event.
    pub fn is_game_over(&self) -> bool {
        matches!(self.data, RunEventData::GameOver { .. })
    }
}

// =============================================================================
// EVENT BUS
// =============================================================================

/// Receiver of run events (score display, audio, scene flow).
pub trait RunListener {
    /// Called synchronously for every emitted event.
    fn on_event(&mut self, event: &RunEvent);
}

impl<F: FnMut(&RunEvent)> RunListener for F {
    fn on_event(&mut self, event: &RunEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::attach`].
pub type SubscriberId = u32;

/// Fan-out of run events to attached listeners.
///
/// Listeners are called in attach order.
#[derive(Default)]
pub struct EventBus {
    tick: u32,
    next_id: SubscriberId,
    listeners: BTreeMap<SubscriberId, Box<dyn RunListener>>,
    log: Vec<RunEvent>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener.
    pub fn attach(&mut self, listener: Box<dyn RunListener>) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Detach a listener. Returns false if it was not attached.
    pub fn detach(&mut self, id: SubscriberId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Set the tick stamped on subsequent events.
    pub fn set_tick(&mut self, tick: u32) {
        self.tick = tick;
    }

    /// Deliver an event and record it.
    pub fn emit(&mut self, data: RunEventData) {
        let event = RunEvent::new(self.tick, data);
        for listener in self.listeners.values_mut() {
            listener.on_event(&event);
        }
        self.log.push(event);
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.log)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("tick", &self.tick)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("pending", &self.log.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<RunEvent>>>, Box<dyn RunListener>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |e: &RunEvent| sink.borrow_mut().push(e.clone())))
    }

    #[test]
    fn test_emit_reaches_listeners_and_log() {
        let mut bus = EventBus::new();
        let (seen, listener) = recorder();
        bus.attach(listener);

        bus.set_tick(7);
        bus.emit(RunEventData::ScoreUpdated { score: 3 });

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].tick, 7);

        let drained = bus.take_events();
        assert_eq!(drained, seen.borrow().clone());
        assert!(bus.take_events().is_empty());
    }

    #[test]
    fn test_detach_stops_delivery() {
        let mut bus = EventBus::new();
        let (seen, listener) = recorder();
        let id = bus.attach(listener);

        assert!(bus.detach(id));
        assert!(!bus.detach(id));

        bus.emit(RunEventData::GameOver { final_score: 10 });
        assert!(seen.borrow().is_empty());

        // Still logged for the run to drain
        let logged = bus.take_events();
        assert_eq!(logged.len(), 1);
        assert!(logged[0].is_game_over());
    }
}
