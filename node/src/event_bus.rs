//! Fan-out of ledger reward events to observers.

use votereward_ledger::RewardEvent;

type Listener = Box<dyn Fn(&RewardEvent) + Send + Sync>;

/// Synchronous fan-out event bus for reward events.
///
/// Listeners run inline on the emitting task, after the ledger write that
/// produced the event has completed.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &RewardEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn emit_all(&self, events: &[RewardEvent]) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
