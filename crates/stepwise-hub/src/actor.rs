//! Actor-hosted multiplexing
//!
//! The same round-robin schedule expressed as actors, so a root stepping
//! instance can step through the multiplexing itself. Each child stepping is
//! wrapped as an adapter actor that answers a request with `true` when it did
//! work and `false` when it was idle.
//!
//! The multiplexer actor alternates between two behaviors:
//! - `dispatch`: send a request to the current child, then become `await`
//! - `await`: record the reply, then either wake itself and become
//!   `dispatch`, or stay put once idle

use crate::producer::{Report, SharedStepping};
use crate::round_robin::RoundRobin;
use std::cell::RefCell;
use std::rc::Rc;
use stepwise_core::{adapter, Address, Behavior, Error, LoopControl, LoopOptions, Request, Value};

/// Adapter actor running one `dispatch` on `stepping` per request
pub fn dispatch_adapter(stepping: SharedStepping) -> Behavior {
    adapter("dispatch-adapter", move |_| {
        let mut stepping = stepping
            .try_borrow_mut()
            .map_err(|_| Error::raised("stepping is already running"))?;
        Ok(Value::Bool(stepping.dispatch().is_some()))
    })
}

/// Adapter actor running one bounded `event_loop` on `stepping` per request
///
/// Replies `true` while the budget runs out before the queue does.
pub fn event_loop_adapter(stepping: SharedStepping, options: LoopOptions) -> Behavior {
    adapter("event-loop-adapter", move |_| {
        let mut stepping = stepping
            .try_borrow_mut()
            .map_err(|_| Error::raised("stepping is already running"))?;
        let exhausted = stepping.event_loop(LoopControl::from_options(&options))?;
        Ok(Value::Bool(!exhausted))
    })
}

/// Multiplexer actor cycling over adapter `children`
///
/// Start it by sending it any message. Failures reported by a child count
/// as idle. An empty child list never sends anything.
pub fn round_robin(children: Vec<Address>) -> Behavior {
    let schedule = Rc::new(RefCell::new(RoundRobin::new(children.len())));
    dispatching(Rc::new(children), schedule)
}

fn dispatching(children: Rc<Vec<Address>>, schedule: Rc<RefCell<RoundRobin>>) -> Behavior {
    Behavior::new("round-robin-dispatch", move |ex, _| {
        let Some(child) = children.get(schedule.borrow().current()).cloned() else {
            return Ok(());
        };
        let this = ex.this().clone();
        ex.send(&child, Request::split(Vec::new(), this.clone(), this));
        ex.become_behavior(awaiting(children.clone(), schedule.clone()));
        Ok(())
    })
}

fn awaiting(children: Rc<Vec<Address>>, schedule: Rc<RefCell<RoundRobin>>) -> Behavior {
    Behavior::new("round-robin-await", move |ex, reply| {
        let report = match reply {
            Value::Bool(true) => Report::DidWork,
            Value::Bool(false) => Report::Idle,
            Value::String(reason) => Report::Failed(reason),
            other => Report::Failed(format!("unexpected reply: {}", other)),
        };
        let index = schedule.borrow().current();
        if let Report::Failed(reason) = &report {
            tracing::warn!(child = index, %reason, "child failed");
        }

        let next = schedule.borrow_mut().record(report.is_work());
        match next {
            Some(_) => {
                ex.send_self(Value::Null);
                ex.become_behavior(dispatching(children.clone(), schedule.clone()));
            }
            None => tracing::info!(children = children.len(), "round robin idle"),
        }
        Ok(())
    })
}
