//! Effect records and the merges that move them into the event queue
//!
//! An [`Effect`] is the complete observable outcome of one dispatch step.
//! Between steps the stepping instance keeps a *pending* effect that collects
//! creations and sends made from outside any behavior.

use crate::{Address, Behavior, Error, Event, EventQueue};
use std::fmt;

/// Observable outcome of one dispatch step
#[derive(Debug, Clone, Default)]
pub struct Effect {
    /// The event that was dispatched
    pub event: Option<Event>,
    /// The target's behavior before invocation
    pub behavior: Option<Behavior>,
    /// The target's new behavior, present only if it changed
    pub became: Option<Behavior>,
    /// Actors created during the step, in creation order
    pub created: Vec<Address>,
    /// Events sent during the step, in send order
    pub sent: Vec<Event>,
    /// The error raised by the behavior, if any
    pub exception: Option<Error>,
}

impl Effect {
    /// Create an empty effect
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether nothing at all was recorded
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
            && self.behavior.is_none()
            && self.became.is_none()
            && self.created.is_empty()
            && self.sent.is_empty()
            && self.exception.is_none()
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.event {
            Some(event) => write!(f, "{}", event)?,
            None => write!(f, "external")?,
        }
        if let Some(behavior) = &self.behavior {
            write!(f, " [{}", behavior.name())?;
            if let Some(became) = &self.became {
                write!(f, " -> {}", became.name())?;
            }
            write!(f, "]")?;
        }
        write!(f, " created={} sent={}", self.created.len(), self.sent.len())?;
        if let Some(exception) = &self.exception {
            write!(f, " exception={}", exception)?;
        }
        Ok(())
    }
}

/// Merge effects accumulated outside any dispatch into `queue`
///
/// Sends are enqueued as one batch. When anything was pending, `pending` is
/// replaced with a fresh effect. Returns whether anything was consumed.
pub fn merge_external(pending: &mut Effect, queue: &mut dyn EventQueue) -> bool {
    let mut changed = false;
    if !pending.sent.is_empty() {
        queue.enqueue(&pending.sent);
        changed = true;
    }
    if !pending.created.is_empty() {
        changed = true;
    }
    if changed {
        tracing::trace!(
            created = pending.created.len(),
            sent = pending.sent.len(),
            "merged external effect"
        );
        *pending = Effect::new();
    }
    changed
}

/// Flush the sends of a completed step into `queue` and reset `pending`
pub fn merge_behavior(step: &Effect, pending: &mut Effect, queue: &mut dyn EventQueue) {
    if !step.sent.is_empty() {
        queue.enqueue(&step.sent);
    }
    *pending = Effect::new();
}
