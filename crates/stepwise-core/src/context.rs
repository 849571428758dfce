//! Actor contexts, addresses and the creation capability

use crate::{Behavior, ContextId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An actor's identity and its mutable current-behavior cell
pub struct Context {
    id: ContextId,
    behavior: RefCell<Behavior>,
}

/// Handle to an actor context, usable as a send target and equality key
///
/// Cloning an address is cheap. Two addresses are equal only when they refer
/// to the same context.
#[derive(Clone)]
pub struct Address(Rc<Context>);

impl Address {
    /// Create a fresh context with the given id and initial behavior
    pub fn new(id: ContextId, behavior: Behavior) -> Self {
        Self(Rc::new(Context {
            id,
            behavior: RefCell::new(behavior),
        }))
    }

    /// Get the context id
    pub fn id(&self) -> ContextId {
        self.0.id
    }

    /// Get the current behavior
    pub fn behavior(&self) -> Behavior {
        self.0.behavior.borrow().clone()
    }

    pub(crate) fn set_behavior(&self, behavior: Behavior) {
        *self.0.behavior.borrow_mut() = behavior;
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.id)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("id", &self.0.id)
            .field("behavior", &self.0.behavior.borrow().name())
            .finish()
    }
}

/// The creation capability: instantiates actors from behaviors
///
/// A stepping instance records every address returned here as a creation
/// in its pending effect.
pub trait Configuration {
    /// Create a new actor with `behavior` as its initial behavior
    fn create(&mut self, behavior: Behavior) -> Address;
}

/// Default configuration minting sequential context ids
#[derive(Debug, Clone, Default)]
pub struct SequentialConfig {
    next: u64,
}

impl SequentialConfig {
    /// Create a configuration whose first id is 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration whose first id is `start`
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// Peek at the next id without consuming it
    pub fn peek(&self) -> ContextId {
        ContextId(self.next)
    }
}

impl Configuration for SequentialConfig {
    fn create(&mut self, behavior: Behavior) -> Address {
        let id = ContextId(self.next);
        self.next += 1;
        Address::new(id, behavior)
    }
}
