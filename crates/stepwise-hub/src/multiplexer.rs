//! Multiplexer - Fair round-robin over independent producers
//!
//! The multiplexer owns the rotation index and idle countdown exclusively.
//! Producers never see each other; each one only drives its own stepping
//! instance.
//!
//! ```text
//! Dispatching(i) ──invoke──▶ AwaitingResult(i) ──report──▶ Dispatching(next)
//!                                                      └──▶ Idle
//! ```

use crate::config::MultiplexConfig;
use crate::error::{Error, Result};
use crate::producer::{Producer, Report, SharedStepping};
use crate::round_robin::RoundRobin;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Where the multiplexer is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplexState {
    /// Producer `i` is next to be invoked
    Dispatching(usize),
    /// Producer `i` was invoked and its report is outstanding
    AwaitingResult(usize),
    /// A full round reported no work
    Idle,
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexSummary {
    /// Producer invocations
    pub cycles: u64,
    /// Invocations that reported work
    pub work_cycles: u64,
    /// Invocations that failed
    pub failures: u64,
    /// Every report in invocation order
    pub trace: Vec<(String, Report)>,
}

impl MultiplexSummary {
    fn record(&mut self, label: &str, report: &Report) {
        self.cycles += 1;
        match report {
            Report::DidWork => self.work_cycles += 1,
            Report::Idle => {}
            Report::Failed(_) => self.failures += 1,
        }
        self.trace.push((label.to_string(), report.clone()));
    }

    /// Reports produced by the producer with `label`
    pub fn reports_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Report> + 'a {
        self.trace
            .iter()
            .filter(move |(l, _)| l == label)
            .map(|(_, report)| report)
    }
}

impl fmt::Display for MultiplexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles, {} with work, {} failed",
            self.cycles, self.work_cycles, self.failures
        )
    }
}

struct Slot {
    label: String,
    producer: Box<dyn Producer>,
}

/// Round-robin scheduler over boxed producers
///
/// # Example
///
/// ```
/// use stepwise_hub::{MultiplexState, Multiplexer, Result};
///
/// let mut remaining = 2;
/// let mut mux = Multiplexer::new();
/// mux.add_producer("twice", move || -> Result<bool> {
///     remaining -= 1;
///     Ok(remaining >= 0)
/// });
///
/// let summary = mux.run().unwrap();
/// assert_eq!(summary.work_cycles, 2);
/// assert_eq!(summary.cycles, 3);
/// assert_eq!(mux.state(), MultiplexState::Idle);
/// ```
pub struct Multiplexer {
    slots: Vec<Slot>,
    schedule: RoundRobin,
    state: MultiplexState,
    summary: MultiplexSummary,
}

impl Multiplexer {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            schedule: RoundRobin::new(0),
            state: MultiplexState::Dispatching(0),
            summary: MultiplexSummary::default(),
        }
    }

    /// Build a multiplexer from `config`, binding steppings in order
    pub fn from_config(config: &MultiplexConfig, steppings: Vec<SharedStepping>) -> Result<Self> {
        if config.len() != steppings.len() {
            return Err(Error::Config(format!(
                "{} producers configured but {} steppings given",
                config.len(),
                steppings.len()
            )));
        }
        let mut mux = Self::new();
        for (spec, stepping) in config.producers.iter().zip(steppings) {
            mux.add_boxed(spec.label.clone(), spec.build(stepping));
        }
        Ok(mux)
    }

    /// Add a producer at the end of the rotation
    ///
    /// Restarts the schedule from the first producer.
    pub fn add_producer(&mut self, label: impl Into<String>, producer: impl Producer + 'static) {
        self.add_boxed(label.into(), Box::new(producer));
    }

    fn add_boxed(&mut self, label: String, producer: Box<dyn Producer>) {
        self.slots.push(Slot { label, producer });
        self.schedule = RoundRobin::new(self.slots.len());
        self.state = MultiplexState::Dispatching(0);
    }

    /// Get the number of producers
    pub fn producer_count(&self) -> usize {
        self.slots.len()
    }

    /// Labels in rotation order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.label.as_str())
    }

    pub fn state(&self) -> MultiplexState {
        self.state
    }

    /// What has happened so far
    pub fn summary(&self) -> &MultiplexSummary {
        &self.summary
    }

    /// Invoke the current producer once and advance
    ///
    /// Producer errors and panics are recorded as `Report::Failed` and
    /// scheduled as idle. Cycling an idle multiplexer does nothing.
    pub fn cycle(&mut self) -> Result<MultiplexState> {
        let index = match self.state {
            MultiplexState::Idle => return Ok(MultiplexState::Idle),
            MultiplexState::Dispatching(i) | MultiplexState::AwaitingResult(i) => i,
        };
        let slot = self.slots.get_mut(index).ok_or(Error::NoProducers)?;

        self.state = MultiplexState::AwaitingResult(index);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| slot.producer.produce()));
        let report = match outcome {
            Ok(Ok(true)) => Report::DidWork,
            Ok(Ok(false)) => Report::Idle,
            Ok(Err(err)) => Report::Failed(err.to_string()),
            Err(payload) => Report::Failed(panic_message(payload)),
        };
        if let Report::Failed(reason) = &report {
            tracing::warn!(producer = %slot.label, %reason, "producer failed");
        } else {
            tracing::debug!(producer = %slot.label, %report, "producer reported");
        }
        self.summary.record(&slot.label, &report);

        self.state = match self.schedule.record(report.is_work()) {
            Some(next) => MultiplexState::Dispatching(next),
            None => {
                tracing::info!(
                    cycles = self.summary.cycles,
                    work_cycles = self.summary.work_cycles,
                    "multiplexer idle"
                );
                MultiplexState::Idle
            }
        };
        Ok(self.state)
    }

    /// Cycle until every producer has reported idle for a full round
    ///
    /// Does not return if producers keep reporting work forever.
    pub fn run(&mut self) -> Result<MultiplexSummary> {
        if self.slots.is_empty() {
            return Err(Error::NoProducers);
        }
        while self.cycle()? != MultiplexState::Idle {}
        Ok(self.summary.clone())
    }
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiplexer")
            .field("labels", &self.labels().collect::<Vec<_>>())
            .field("schedule", &self.schedule)
            .field("state", &self.state)
            .finish()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
