//! Stepwise Hub - Fair multiplexing of independent stepping instances
//!
//! This crate interleaves several `stepwise-core` steppings one unit of work
//! at a time until all of them are durably idle.
//!
//! ## Architecture
//!
//! ```text
//! Multiplexer (owns index + idle countdown)
//!  │
//!  ├── Producer (trait) ← Multiplexer only interacts with this
//!  │    ├── DispatchProducer ── one dispatch()
//!  │    └── LoopProducer ────── one bounded event_loop()
//!  │         └── Rc<RefCell<Stepping>> (private queue + effect)
//!  │
//!  └── MultiplexSummary (trace of reports)
//! ```
//!
//! ## Key Components
//!
//! - [`Multiplexer`]: Round-robin scheduler with an idle countdown
//! - [`Producer`]: Trait for one schedulable unit of work
//! - [`Report`]: Tri-state outcome; failures are scheduled as idle
//! - [`MultiplexConfig`]: RON-loadable producer layout
//! - [`actor`]: The same schedule hosted inside a root stepping instance
//!
//! ## Design Principles
//!
//! 1. **stepwise-core is standalone** - it does NOT know about stepwise-hub
//! 2. **Producers never share state** - each drives its own stepping
//! 3. **A crashing producer degrades to silence** - it never halts the rest

pub mod actor;
mod config;
mod error;
mod multiplexer;
mod producer;
mod round_robin;

pub use config::{MultiplexConfig, ProducerMode, ProducerSpec};
pub use error::{Error, Result};
pub use multiplexer::{MultiplexState, MultiplexSummary, Multiplexer};
pub use producer::{shared, DispatchProducer, LoopProducer, Producer, Report, SharedStepping};
pub use round_robin::RoundRobin;
