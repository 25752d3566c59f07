/// A sequenced event record.
///
/// `seq` is assigned by the bus in emission order, starting at 0, and keeps
/// counting across drains so a subscriber can detect gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub seq: u64,
    pub payload: E,
}

/// Ordered outbox between an owner (the writer) and the view layer.
///
/// Only the owner emits; subscribers drain. Nothing here is shared across
/// threads.
#[derive(Debug)]
pub struct EventBus<E> {
    next_seq: u64,
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            events: Vec::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, payload: E) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, payload });
        seq
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
