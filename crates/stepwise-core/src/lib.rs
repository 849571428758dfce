//! Stepwise Core - Single-step execution of actor-style programs
//!
//! This crate makes message-passing programs reproducible by turning every
//! message delivery into one explicit step:
//! - Actors (`Address`) with a replaceable current `Behavior`
//! - Pluggable event queues (`EventQueue`, `BatchQueue`, `FlatQueue`)
//! - Per-step `Effect` records (event, created, sent, became, exception)
//! - The `Stepping` dispatcher and its bounded event loop (`LoopControl`)
//! - Adapter behaviors that bridge synchronous calls into requests
//!
//! ## Example
//!
//! ```
//! use stepwise_core::{Behavior, Stepping, Value};
//!
//! let mut stepping = Stepping::new();
//! let echo = stepping.sponsor(Behavior::new("echo", |ex, message| {
//!     if message.as_int() == Some(1) {
//!         ex.send_self(2i64);
//!     }
//!     Ok(())
//! }));
//! stepping.send(&echo, 1i64);
//!
//! let first = stepping.dispatch().unwrap();
//! assert_eq!(first.sent[0].message, Value::Int(2));
//!
//! let second = stepping.dispatch().unwrap();
//! assert!(second.sent.is_empty());
//!
//! assert!(stepping.dispatch().is_none());
//! ```
//!
//! Everything here is single-threaded: addresses and behaviors are `Rc`
//! handles and a behavior always runs to completion inside one dispatch.

mod adapter;
mod behavior;
mod context;
mod control;
pub mod effect;
mod error;
mod event;
mod identity;
pub mod queue;
pub mod stepping;
mod value;

pub use adapter::{adapter, Reply, Request};
pub use behavior::{Behavior, Execution};
pub use context::{Address, Configuration, SequentialConfig};
pub use control::{LoopControl, LoopOptions};
pub use effect::Effect;
pub use error::{Error, Result};
pub use event::Event;
pub use identity::ContextId;
pub use queue::{BatchQueue, EventQueue, FlatQueue};
pub use stepping::{Stepping, SteppingOptions};
pub use value::{Value, ValueMap};
