//! Stepping configuration: dispatch one event at a time
//!
//! A [`Stepping`] owns an event queue, the pending effect and a creation
//! capability. Nothing runs until the caller asks for it: each call to
//! [`Stepping::dispatch`] delivers exactly one event and hands back the
//! resulting [`Effect`].
//!
//! Sends never execute inline. Events sent during step *k* are flushed into
//! the queue when step *k* ends and can only be delivered by step *k+1* or
//! later.

use crate::effect::{merge_behavior, merge_external};
use crate::{
    Address, BatchQueue, Behavior, Configuration, Effect, Error, Event, EventQueue, Execution,
    LoopControl, Result, SequentialConfig, Value,
};
use std::panic::{self, AssertUnwindSafe};

/// Pluggable parts of a stepping instance
///
/// The queue carries both enqueue and dequeue, so they are always replaced
/// together.
pub struct SteppingOptions {
    /// Queue policy
    pub queue: Box<dyn EventQueue>,
    /// Creation capability
    pub config: Box<dyn Configuration>,
}

impl SteppingOptions {
    /// Default options: batched queue and sequential ids
    pub fn new() -> Self {
        Self {
            queue: Box::new(BatchQueue::new()),
            config: Box::new(SequentialConfig::new()),
        }
    }

    /// Replace the queue policy
    pub fn queue(mut self, queue: impl EventQueue + 'static) -> Self {
        self.queue = Box::new(queue);
        self
    }

    /// Replace the creation capability
    pub fn config(mut self, config: impl Configuration + 'static) -> Self {
        self.config = Box::new(config);
        self
    }
}

impl Default for SteppingOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A stepping configuration instance
pub struct Stepping {
    queue: Box<dyn EventQueue>,
    config: Box<dyn Configuration>,
    /// Effects accumulated since the last merge
    effect: Effect,
}

impl Stepping {
    /// Create a stepping instance with default options
    pub fn new() -> Self {
        Self::with_options(SteppingOptions::new())
    }

    /// Create a stepping instance with custom options
    pub fn with_options(options: SteppingOptions) -> Self {
        Self {
            queue: options.queue,
            config: options.config,
            effect: Effect::new(),
        }
    }

    /// The pending effect: creations and sends not yet consumed by a dispatch
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Create an actor from outside any behavior
    pub fn sponsor(&mut self, behavior: Behavior) -> Address {
        let address = self.config.create(behavior);
        self.effect.created.push(address.clone());
        address
    }

    /// Send a message from outside any behavior
    pub fn send(&mut self, to: &Address, message: impl Into<Value>) {
        self.effect.sent.push(Event::new(message, to.clone()));
    }

    /// Number of events awaiting dispatch, including external sends not yet merged
    pub fn pending(&self) -> usize {
        self.queue.len() + self.effect.sent.len()
    }

    /// Dispatch the next event
    ///
    /// Returns the effect of delivering it, or `None` if no event exists.
    /// Failures raised by the behavior, including panics, are captured in
    /// [`Effect::exception`] and never propagate.
    pub fn dispatch(&mut self) -> Option<Effect> {
        merge_external(&mut self.effect, self.queue.as_mut());

        let event = self.queue.dequeue()?;
        let target = event.context.clone();
        let message = event.message.clone();
        let behavior = target.behavior();

        let mut effect = std::mem::take(&mut self.effect);
        effect.event = Some(event);
        effect.behavior = Some(behavior.clone());

        tracing::debug!(
            target_ctx = %target,
            behavior = behavior.name(),
            message = %message,
            "dispatching event"
        );

        let outcome = {
            let mut execution = Execution::new(target.clone(), &mut effect, self.config.as_mut());
            panic::catch_unwind(AssertUnwindSafe(|| behavior.invoke(&mut execution, message)))
        };
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(exception)) => effect.exception = Some(exception),
            Err(payload) => effect.exception = Some(Error::Panicked(panic_message(payload))),
        }
        if let Some(exception) = &effect.exception {
            tracing::warn!(target_ctx = %target, %exception, "behavior failed");
        }

        let current = target.behavior();
        if !current.same(&behavior) {
            effect.became = Some(current);
        }

        merge_behavior(&effect, &mut self.effect, self.queue.as_mut());

        tracing::debug!(
            created = effect.created.len(),
            sent = effect.sent.len(),
            became = ?effect.became.as_ref().map(Behavior::name),
            "dispatched event"
        );
        Some(effect)
    }

    /// Dispatch events as directed by `control`
    ///
    /// Returns `Ok(true)` when the queue was exhausted and `Ok(false)` when
    /// the step budget ran out first, in which case events may remain. An
    /// `Err` is whatever the control's fail hook raised.
    pub fn event_loop(&mut self, mut control: LoopControl<'_>) -> Result<bool> {
        let mut remaining = control.budget();
        loop {
            if let Some(left) = remaining.as_mut() {
                if *left == 0 {
                    return Ok(false);
                }
                *left -= 1;
            }

            let effect = self.dispatch();
            control.log_effect(effect.as_ref());
            let Some(effect) = effect else {
                return Ok(true);
            };
            if let Some(exception) = &effect.exception {
                control.fail_with(exception)?;
            }
        }
    }
}

impl Default for Stepping {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Stepping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stepping")
            .field("queued", &self.queue.len())
            .field("effect", &self.effect)
            .finish()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextId, FlatQueue};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn countdown(log: Rc<RefCell<Vec<(String, i64)>>>, label: &'static str) -> Behavior {
        Behavior::new("countdown", move |ex, message| {
            let count = message
                .as_int()
                .ok_or_else(|| Error::type_error("int", message.type_name()))?;
            log.borrow_mut().push((label.to_string(), count));
            if count - 1 > 0 {
                ex.send_self(count - 1);
            }
            Ok(())
        })
    }

    #[test]
    fn test_initial_state_before_dispatch() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::ignore());
        let actor2 = stepping.sponsor(Behavior::ignore());
        stepping.send(&actor, &actor2);

        let effect = stepping.effect();
        assert_eq!(effect.created, vec![actor.clone(), actor2.clone()]);
        assert_eq!(effect.sent.len(), 1);
        assert_eq!(effect.sent[0].message, Value::from(&actor2));
        assert_eq!(effect.sent[0].context, actor);
        assert_eq!(stepping.pending(), 1);
    }

    #[test]
    fn test_snapshot_unchanged_by_dispatch() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::ignore());
        let actor2 = stepping.sponsor(Behavior::ignore());
        stepping.send(&actor, &actor2);
        let initial = stepping.effect().clone();

        stepping.dispatch().unwrap();
        assert_eq!(initial.created, vec![actor.clone(), actor2]);
        assert_eq!(initial.sent.len(), 1);
        assert_eq!(initial.sent[0].context, actor);
        assert!(stepping.effect().is_empty());
    }

    #[test]
    fn test_dispatch_one_event_per_call() {
        let mut stepping = Stepping::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let actor = stepping.sponsor(Behavior::new("record", move |_, message| {
            sink.borrow_mut().push(message);
            Ok(())
        }));
        stepping.send(&actor, "foo");
        stepping.send(&actor, "bar");

        assert!(seen.borrow().is_empty());
        stepping.dispatch().unwrap();
        assert_eq!(*seen.borrow(), vec![Value::from("foo")]);
        stepping.dispatch().unwrap();
        assert_eq!(*seen.borrow(), vec![Value::from("foo"), Value::from("bar")]);
    }

    #[test]
    fn test_dispatch_returns_effect() {
        let mut stepping = Stepping::new();
        let created_beh = Behavior::new("created", |_, _| Ok(()));
        let become_beh = Behavior::new("become", |_, _| Ok(()));

        let (c, b) = (created_beh.clone(), become_beh.clone());
        let test_beh = Behavior::new("test", move |ex, _| {
            let actor = ex.create(c.clone());
            ex.send(&actor, "foo");
            ex.become_behavior(b.clone());
            Ok(())
        });

        let actor = stepping.sponsor(test_beh.clone());
        stepping.send(&actor, "bar");

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.created.len(), 1);
        assert_eq!(effect.created[0].behavior(), created_beh);
        let event = effect.event.as_ref().unwrap();
        assert_eq!(event.message, Value::from("bar"));
        assert_eq!(effect.sent[0].message, Value::from("foo"));
        assert_eq!(effect.behavior, Some(test_beh));
        assert_eq!(effect.became, Some(become_beh.clone()));
        assert_eq!(event.context.behavior(), become_beh);
        assert!(effect.exception.is_none());
    }

    #[test]
    fn test_dispatch_captures_error() {
        let mut stepping = Stepping::new();
        let crash = Behavior::new("crash", |_, _| Err(Error::raised("boom")));
        let actor = stepping.sponsor(crash.clone());
        stepping.send(&actor, "explode");

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.behavior, Some(crash));
        assert_eq!(effect.exception, Some(Error::raised("boom")));
    }

    #[test]
    fn test_dispatch_captures_panic() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::new("panic", |_, _| panic!("kaboom")));
        stepping.send(&actor, Value::Null);

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.exception, Some(Error::Panicked("kaboom".to_string())));
        assert!(stepping.dispatch().is_none());
    }

    #[test]
    fn test_partial_effects_kept_on_failure() {
        let mut stepping = Stepping::new();
        let fails_late = Behavior::new("fails_late", |ex, _| {
            let a = ex.create(Behavior::ignore());
            let b = ex.create(Behavior::ignore());
            ex.send(&a, 1i64);
            ex.send(&b, 2i64);
            ex.send(&a, 3i64);
            Err(Error::raised("late"))
        });
        let actor = stepping.sponsor(fails_late);
        stepping.send(&actor, Value::Null);

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.created.len(), 2);
        assert_eq!(effect.sent.len(), 3);
        assert!(effect.exception.is_some());
        assert!(stepping.effect().is_empty());
        // Sends of the failed step are delivered like any other step's
        assert_eq!(stepping.pending(), 3);
    }

    #[test]
    fn test_dispatch_on_empty_queue() {
        let mut stepping = Stepping::new();
        assert!(stepping.dispatch().is_none());
        assert!(stepping.effect().created.is_empty());
        assert!(stepping.effect().sent.is_empty());
    }

    #[test]
    fn test_external_create_consumed_by_empty_dispatch() {
        let mut stepping = Stepping::new();
        stepping.sponsor(Behavior::ignore());
        assert!(stepping.dispatch().is_none());
        assert!(stepping.effect().is_empty());
    }

    #[test]
    fn test_become_applies_to_next_dispatch() {
        let mut stepping = Stepping::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let log = calls.clone();
        let second = Behavior::new("second", move |_, _| {
            log.borrow_mut().push("second");
            Ok(())
        });
        let log = calls.clone();
        let next = second.clone();
        let first = Behavior::new("first", move |ex, _| {
            log.borrow_mut().push("first");
            ex.become_behavior(next.clone());
            Ok(())
        });

        let actor = stepping.sponsor(first);
        stepping.send(&actor, 1i64);
        stepping.send(&actor, 2i64);

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.became, Some(second.clone()));
        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.behavior, Some(second));
        assert!(effect.became.is_none());
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_external_and_behavior_effects_visible() {
        let mut stepping = Stepping::new();
        let step = Rc::new(Cell::new(0));

        let boom = Behavior::new("boom", |_, _| Err(Error::raised("should not be called")));
        let s = step.clone();
        let b = boom.clone();
        let third = Behavior::new("third", move |ex, message| {
            assert_eq!(message, Value::Int(2));
            assert_eq!(s.get(), 6);
            s.set(s.get() + 1);
            ex.become_behavior(b.clone());
            Ok(())
        });
        let s = step.clone();
        let second = Behavior::new("second", move |ex, message| {
            assert_eq!(message, Value::Int(-1));
            assert_eq!(s.get(), 4);
            s.set(s.get() + 1);
            ex.become_behavior(third.clone());
            Ok(())
        });
        let s = step.clone();
        let first = Behavior::new("first", move |ex, message| {
            assert_eq!(message, Value::Int(0));
            assert_eq!(s.get(), 1);
            s.set(s.get() + 1);
            ex.send_self(-1i64);
            ex.become_behavior(second.clone());
            Ok(())
        });

        let actor = stepping.sponsor(first);
        stepping.send(&actor, 0i64);

        let effect = stepping.effect();
        assert_eq!(step.get(), 0);
        step.set(1);
        assert_eq!(effect.created, vec![actor.clone()]);
        assert_eq!(effect.sent[0].message, Value::Int(0));

        let effect = stepping.dispatch().unwrap();
        assert_eq!(step.get(), 2);
        step.set(3);
        assert!(effect.created.is_empty());
        assert_eq!(effect.sent.len(), 1);
        assert_eq!(effect.sent[0].message, Value::Int(-1));

        stepping.send(&actor, 2i64);
        let unused = stepping.sponsor(boom);

        let effect = stepping.effect();
        assert_eq!(step.get(), 3);
        step.set(4);
        assert_eq!(effect.created, vec![unused]);
        assert_eq!(effect.sent.len(), 1);
        assert_eq!(effect.sent[0].message, Value::Int(2));

        let effect = stepping.dispatch().unwrap();
        assert_eq!(step.get(), 5);
        step.set(6);
        assert!(effect.created.is_empty());
        assert!(effect.sent.is_empty());

        let effect = stepping.dispatch().unwrap();
        assert_eq!(step.get(), 7);
        assert!(effect.created.is_empty());
        assert!(effect.sent.is_empty());
        assert!(effect.exception.is_none());

        assert!(stepping.dispatch().is_none());
    }

    #[test]
    fn test_event_loop_exhausts_queue() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(countdown(log.clone(), "A"));
        stepping.send(&actor, 3i64);

        let mut logged = Vec::new();
        let exhausted = stepping
            .event_loop(LoopControl::new().log(|effect| logged.push(effect.is_some())))
            .unwrap();
        assert!(exhausted);
        assert_eq!(logged, vec![true, true, true, false]);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_event_loop_budget() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(countdown(log.clone(), "A"));
        stepping.send(&actor, 5i64);

        assert!(!stepping.event_loop(LoopControl::new().count(2)).unwrap());
        assert_eq!(log.borrow().len(), 2);
        assert!(stepping.pending() > 0);

        // Three deliveries remain; the fourth dispatch finds the queue empty
        assert!(!stepping.event_loop(LoopControl::new().count(3)).unwrap());
        assert!(stepping.event_loop(LoopControl::new().count(1)).unwrap());
        assert_eq!(log.borrow().len(), 5);
    }

    #[test]
    fn test_event_loop_zero_budget() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::ignore());
        stepping.send(&actor, 1i64);

        assert!(!stepping.event_loop(LoopControl::new().count(0)).unwrap());
        assert_eq!(stepping.pending(), 1);
    }

    #[test]
    fn test_event_loop_default_fail_reraises() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::new("crash", |_, _| Err(Error::raised("boom"))));
        let other = stepping.sponsor(Behavior::ignore());
        stepping.send(&actor, 1i64);
        stepping.send(&other, 2i64);

        let err = stepping.event_loop(LoopControl::new()).unwrap_err();
        assert_eq!(err, Error::raised("boom"));
        // Queue state is intact after the abort
        assert_eq!(stepping.pending(), 1);
        assert!(stepping.dispatch().is_some());
    }

    #[test]
    fn test_event_loop_custom_fail_continues() {
        let mut stepping = Stepping::new();
        let actor = stepping.sponsor(Behavior::new("crash", |_, _| Err(Error::raised("boom"))));
        stepping.send(&actor, 1i64);
        stepping.send(&actor, 2i64);

        let mut failures = Vec::new();
        let exhausted = stepping
            .event_loop(LoopControl::new().fail(|e| {
                failures.push(e.clone());
                Ok(())
            }))
            .unwrap();
        assert!(exhausted);
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_flat_queue_same_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stepping = Stepping::with_options(SteppingOptions::new().queue(FlatQueue::new()));
        let a = stepping.sponsor(countdown(log.clone(), "A"));
        let b = stepping.sponsor(countdown(log.clone(), "B"));
        stepping.send(&a, 2i64);
        stepping.send(&b, 2i64);

        assert!(stepping.event_loop(LoopControl::new()).unwrap());
        let order: Vec<_> = log.borrow().iter().map(|(l, n)| format!("{l}{n}")).collect();
        assert_eq!(order, vec!["A2", "B2", "A1", "B1"]);
    }

    #[test]
    fn test_custom_configuration() {
        let mut stepping =
            Stepping::with_options(SteppingOptions::new().config(SequentialConfig::starting_at(10)));
        let actor = stepping.sponsor(Behavior::new("spawner", |ex, _| {
            ex.create(Behavior::ignore());
            Ok(())
        }));
        assert_eq!(actor.id(), ContextId(10));
        stepping.send(&actor, Value::Null);

        let effect = stepping.dispatch().unwrap();
        assert_eq!(effect.created[0].id(), ContextId(11));
    }
}
