//! Pending message deliveries

use crate::{Address, Value};
use std::fmt;

/// A message paired with the context it is addressed to
///
/// Events are created by a send and consumed when dequeued for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The message to deliver
    pub message: Value,
    /// The target actor
    pub context: Address,
}

impl Event {
    /// Create a new event
    pub fn new(message: impl Into<Value>, context: Address) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.context, self.message)
    }
}
