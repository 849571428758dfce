//! Behaviors and the per-invocation execution context

use crate::context::{Address, Configuration};
use crate::{Effect, Event, Result, Value};
use std::fmt;
use std::rc::Rc;

type BehaviorFn = dyn Fn(&mut Execution<'_>, Value) -> Result<()>;

/// The function invoked when a message is delivered to an actor
///
/// Behaviors are shared handles. Two behaviors are equal only when they are
/// clones of the same handle, which is how a step detects that its actor
/// replaced its own behavior.
#[derive(Clone)]
pub struct Behavior {
    name: Rc<str>,
    func: Rc<BehaviorFn>,
}

impl Behavior {
    /// Create a named behavior
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Execution<'_>, Value) -> Result<()> + 'static,
    {
        Self {
            name: Rc::from(name.into()),
            func: Rc::new(func),
        }
    }

    /// A behavior that accepts and ignores every message
    pub fn ignore() -> Self {
        Self::new("ignore", |_, _| Ok(()))
    }

    /// Get the behavior's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether two handles refer to the same behavior
    pub fn same(&self, other: &Behavior) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    pub(crate) fn invoke(&self, execution: &mut Execution<'_>, message: Value) -> Result<()> {
        (self.func)(execution, message)
    }
}

impl PartialEq for Behavior {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Behavior({})", self.name)
    }
}

/// Capabilities handed to a behavior for the duration of one invocation
///
/// Everything done through an `Execution` is recorded in the step's effect.
/// Sends only become deliverable after the step completes.
pub struct Execution<'a> {
    this: Address,
    effect: &'a mut Effect,
    config: &'a mut dyn Configuration,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(
        this: Address,
        effect: &'a mut Effect,
        config: &'a mut dyn Configuration,
    ) -> Self {
        Self {
            this,
            effect,
            config,
        }
    }

    /// The address of the actor being invoked
    pub fn this(&self) -> &Address {
        &self.this
    }

    /// The actor's current behavior
    pub fn behavior(&self) -> Behavior {
        self.this.behavior()
    }

    /// Replace the actor's behavior for subsequent messages
    pub fn become_behavior(&mut self, behavior: Behavior) {
        self.this.set_behavior(behavior);
    }

    /// Create a new actor
    pub fn create(&mut self, behavior: Behavior) -> Address {
        let address = self.config.create(behavior);
        self.effect.created.push(address.clone());
        address
    }

    /// Send a message to any actor
    pub fn send(&mut self, to: &Address, message: impl Into<Value>) {
        self.effect.sent.push(Event::new(message, to.clone()));
    }

    /// Send a message to this actor
    pub fn send_self(&mut self, message: impl Into<Value>) {
        let this = self.this.clone();
        self.send(&this, message);
    }
}
