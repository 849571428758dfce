//! Event queue policies
//!
//! Enqueue and dequeue are tightly coupled: a queue that batches on enqueue
//! must unbatch on dequeue. Both live on one trait so a custom policy always
//! replaces the pair.

use crate::Event;
use std::collections::VecDeque;

/// Ordered storage of pending events
pub trait EventQueue {
    /// Append one step's events, cloning them so the caller's list is not aliased
    fn enqueue(&mut self, events: &[Event]);

    /// Remove and return the next deliverable event, or `None` when nothing remains
    fn dequeue(&mut self) -> Option<Event>;

    /// Number of events awaiting dispatch
    fn len(&self) -> usize;

    /// Check whether any event remains
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default policy: one batch per step, consumed in submission order
#[derive(Debug, Clone, Default)]
pub struct BatchQueue {
    batches: VecDeque<VecDeque<Event>>,
}

impl BatchQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches still held, including empty ones not yet discarded
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}

impl EventQueue for BatchQueue {
    fn enqueue(&mut self, events: &[Event]) {
        self.batches.push_back(events.iter().cloned().collect());
    }

    fn dequeue(&mut self) -> Option<Event> {
        while let Some(batch) = self.batches.front_mut() {
            if let Some(event) = batch.pop_front() {
                return Some(event);
            }
            self.batches.pop_front();
        }
        None
    }

    fn len(&self) -> usize {
        self.batches.iter().map(VecDeque::len).sum()
    }
}

/// Alternative policy: batches flattened into a single FIFO
#[derive(Debug, Clone, Default)]
pub struct FlatQueue {
    events: VecDeque<Event>,
}

impl FlatQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventQueue for FlatQueue {
    fn enqueue(&mut self, events: &[Event]) {
        self.events.extend(events.iter().cloned());
    }

    fn dequeue(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
