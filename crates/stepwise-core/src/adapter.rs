//! Adapter behaviors bridging synchronous calls into actor messages
//!
//! A request carries an argument list and where to reply. Two reply shapes
//! are accepted and are otherwise equivalent:
//! - `{ arguments, customer }`: the result goes to `customer`; a failure
//!   becomes the step's exception
//! - `{ arguments, ok, fail }`: the result goes to `ok`, the failure message
//!   to `fail`

use crate::{Address, Behavior, Error, Result, Value, ValueMap};

/// Where an adapter sends its outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Single success callback
    Customer(Address),
    /// Split success/failure callbacks
    Split { ok: Address, fail: Address },
}

/// A call request envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub arguments: Vec<Value>,
    pub reply: Reply,
}

impl Request {
    /// Request replying to a single customer
    pub fn customer(arguments: Vec<Value>, customer: Address) -> Self {
        Self {
            arguments,
            reply: Reply::Customer(customer),
        }
    }

    /// Request with split success/failure callbacks
    pub fn split(arguments: Vec<Value>, ok: Address, fail: Address) -> Self {
        Self {
            arguments,
            reply: Reply::Split { ok, fail },
        }
    }
}

impl From<Request> for Value {
    fn from(request: Request) -> Self {
        let mut map = ValueMap::new();
        map.insert("arguments".to_string(), Value::List(request.arguments));
        match request.reply {
            Reply::Customer(customer) => {
                map.insert("customer".to_string(), Value::Address(customer));
            }
            Reply::Split { ok, fail } => {
                map.insert("ok".to_string(), Value::Address(ok));
                map.insert("fail".to_string(), Value::Address(fail));
            }
        }
        Value::Map(map)
    }
}

impl TryFrom<&Value> for Request {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        let map = value
            .as_map()
            .ok_or_else(|| Error::type_error("map", value.type_name()))?;

        let arguments = match map.get("arguments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::List(list)) => list.clone(),
            Some(other) => return Err(Error::type_error("list", other.type_name())),
        };

        let address = |key: &str| map.get(key).and_then(Value::as_address).cloned();
        let reply = match (address("customer"), address("ok"), address("fail")) {
            (Some(customer), _, _) => Reply::Customer(customer),
            (None, Some(ok), Some(fail)) => Reply::Split { ok, fail },
            _ => {
                return Err(Error::MalformedRequest(
                    "expected `customer` or both `ok` and `fail` addresses".to_string(),
                ))
            }
        };

        Ok(Self { arguments, reply })
    }
}

/// Build a behavior that applies `func` to each request's arguments
///
/// ```
/// use stepwise_core::{adapter, Behavior, Request, Stepping, Value};
///
/// let mut stepping = Stepping::new();
/// let sum = stepping.sponsor(adapter("sum", |args| {
///     Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
/// }));
/// let customer = stepping.sponsor(Behavior::ignore());
/// stepping.send(&sum, Request::customer(vec![1.into(), 2.into()], customer.clone()));
///
/// stepping.dispatch().unwrap();
/// let reply = stepping.dispatch().unwrap();
/// assert_eq!(reply.event.unwrap().message, Value::Int(3));
/// ```
pub fn adapter<F>(name: impl Into<String>, func: F) -> Behavior
where
    F: Fn(&[Value]) -> Result<Value> + 'static,
{
    Behavior::new(name, move |ex, message| {
        let request = Request::try_from(&message)?;
        let outcome = func(&request.arguments);
        match request.reply {
            Reply::Customer(customer) => ex.send(&customer, outcome?),
            Reply::Split { ok, fail } => match outcome {
                Ok(value) => ex.send(&ok, value),
                Err(error) => ex.send(&fail, error.to_string()),
            },
        }
        Ok(())
    })
}
