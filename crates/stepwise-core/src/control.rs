//! Event loop control: step budget plus logging and failure hooks

use crate::{Effect, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable part of an event loop control
///
/// ```
/// use stepwise_core::LoopOptions;
///
/// let unbounded = LoopOptions::default();
/// assert_eq!(unbounded.count, None);
///
/// let one = LoopOptions::with_count(1);
/// assert_eq!(one.count, Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopOptions {
    /// Maximum number of dispatches; `None` runs until the queue is exhausted
    #[serde(default)]
    pub count: Option<u64>,
}

impl LoopOptions {
    /// Options with a step budget
    pub fn with_count(count: u64) -> Self {
        Self { count: Some(count) }
    }
}

type LogHook<'a> = Box<dyn FnMut(Option<&Effect>) + 'a>;
type FailHook<'a> = Box<dyn FnMut(&Error) -> Result<()> + 'a>;

/// Controls one call to [`Stepping::event_loop`](crate::Stepping::event_loop)
///
/// By default the loop is unbounded, logs nothing, and re-raises the first
/// exception captured in an effect.
pub struct LoopControl<'a> {
    count: Option<u64>,
    log: LogHook<'a>,
    fail: FailHook<'a>,
}

impl<'a> LoopControl<'a> {
    /// An unbounded control with default hooks
    pub fn new() -> Self {
        Self {
            count: None,
            log: Box::new(|_| {}),
            fail: Box::new(|exception| Err(exception.clone())),
        }
    }

    /// A control with default hooks built from serialized options
    pub fn from_options(options: &LoopOptions) -> Self {
        let mut control = Self::new();
        control.count = options.count;
        control
    }

    /// Limit the loop to `count` dispatches
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Called with every dispatch result, including `None` when the queue is empty
    pub fn log(mut self, hook: impl FnMut(Option<&Effect>) + 'a) -> Self {
        self.log = Box::new(hook);
        self
    }

    /// Called with each captured exception; returning `Err` ends the loop
    pub fn fail(mut self, hook: impl FnMut(&Error) -> Result<()> + 'a) -> Self {
        self.fail = Box::new(hook);
        self
    }

    /// Get the step budget
    pub fn budget(&self) -> Option<u64> {
        self.count
    }

    pub(crate) fn log_effect(&mut self, effect: Option<&Effect>) {
        (self.log)(effect)
    }

    pub(crate) fn fail_with(&mut self, exception: &Error) -> Result<()> {
        (self.fail)(exception)
    }
}

impl Default for LoopControl<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoopControl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopControl")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
