//! Producers - units of work the multiplexer interleaves
//!
//! A producer performs one unit of work per call and says whether it did
//! anything. Each producer drives its own stepping instance; producers never
//! share a queue.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use stepwise_core::{LoopControl, LoopOptions, Stepping};

/// A stepping instance shared between its producer and the caller
pub type SharedStepping = Rc<RefCell<Stepping>>;

/// Wrap a stepping instance for sharing
pub fn shared(stepping: Stepping) -> SharedStepping {
    Rc::new(RefCell::new(stepping))
}

/// Outcome of one producer invocation
///
/// `Failed` is scheduled exactly like `Idle`; it only exists so failures
/// remain visible in traces and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Report {
    /// The producer did real work
    DidWork,
    /// Nothing to do
    Idle,
    /// The producer raised; treated as idle
    Failed(String),
}

impl Report {
    /// Check whether this report resets the idle countdown
    pub fn is_work(&self) -> bool {
        matches!(self, Report::DidWork)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::DidWork => write!(f, "work"),
            Report::Idle => write!(f, "idle"),
            Report::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// One unit of schedulable work
pub trait Producer {
    /// Perform one unit of work; `Ok(true)` means real work was done
    fn produce(&mut self) -> Result<bool>;
}

impl<F> Producer for F
where
    F: FnMut() -> Result<bool>,
{
    fn produce(&mut self) -> Result<bool> {
        self()
    }
}

/// Producer dispatching a single event per call
///
/// Any returned effect counts as work, including one whose only content is
/// a behavior change or a captured exception. This is a coarse notion of
/// progress: an actor that keeps replacing its own behavior without sending
/// anything keeps the multiplexer alive.
#[derive(Debug, Clone)]
pub struct DispatchProducer {
    stepping: SharedStepping,
}

impl DispatchProducer {
    pub fn new(stepping: SharedStepping) -> Self {
        Self { stepping }
    }

    /// The stepping instance this producer drives
    pub fn stepping(&self) -> &SharedStepping {
        &self.stepping
    }
}

impl Producer for DispatchProducer {
    fn produce(&mut self) -> Result<bool> {
        Ok(self.stepping.borrow_mut().dispatch().is_some())
    }
}

/// Producer running one bounded event loop per call
///
/// Reports work while the loop stops on its budget, and idle once a loop
/// finds the queue exhausted. An unbounded loop therefore always reports
/// idle, even when it dispatched events on the way.
#[derive(Debug, Clone)]
pub struct LoopProducer {
    stepping: SharedStepping,
    options: LoopOptions,
}

impl LoopProducer {
    pub fn new(stepping: SharedStepping, options: LoopOptions) -> Self {
        Self { stepping, options }
    }

    /// The stepping instance this producer drives
    pub fn stepping(&self) -> &SharedStepping {
        &self.stepping
    }

    /// The options applied to every loop
    pub fn options(&self) -> LoopOptions {
        self.options
    }
}

impl Producer for LoopProducer {
    fn produce(&mut self) -> Result<bool> {
        let exhausted = self
            .stepping
            .borrow_mut()
            .event_loop(LoopControl::from_options(&self.options))?;
        Ok(!exhausted)
    }
}
