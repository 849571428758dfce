//! Multiplex Configuration - Producer layout loaded from RON
//!
//! A configuration lists one entry per producer, in rotation order. Each
//! entry names the producer and selects how it drives its stepping instance.

use crate::error::{Error, Result};
use crate::producer::{DispatchProducer, LoopProducer, Producer, SharedStepping};
use serde::{Deserialize, Serialize};
use stepwise_core::LoopOptions;

/// How a producer drives its stepping instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProducerMode {
    /// One `dispatch` per invocation
    #[default]
    Dispatch,
    /// One bounded `event_loop` per invocation
    EventLoop {
        #[serde(default)]
        count: Option<u64>,
    },
}

/// One producer entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerSpec {
    /// Label used in traces and logs
    pub label: String,
    #[serde(default)]
    pub mode: ProducerMode,
}

impl ProducerSpec {
    pub fn new(label: impl Into<String>, mode: ProducerMode) -> Self {
        Self {
            label: label.into(),
            mode,
        }
    }

    /// Build the producer for this entry around `stepping`
    pub fn build(&self, stepping: SharedStepping) -> Box<dyn Producer> {
        match self.mode {
            ProducerMode::Dispatch => Box::new(DispatchProducer::new(stepping)),
            ProducerMode::EventLoop { count } => {
                Box::new(LoopProducer::new(stepping, LoopOptions { count }))
            }
        }
    }
}

/// Configuration for a `Multiplexer`
///
/// # Example
///
/// ```
/// use stepwise_hub::{MultiplexConfig, ProducerMode};
///
/// let config = MultiplexConfig::from_ron(
///     r#"(producers: [
///         (label: "A"),
///         (label: "B", mode: EventLoop(count: Some(4))),
///     ])"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.len(), 2);
/// assert_eq!(config.producers[0].mode, ProducerMode::Dispatch);
/// assert_eq!(config.producers[1].mode, ProducerMode::EventLoop { count: Some(4) });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexConfig {
    #[serde(default)]
    pub producers: Vec<ProducerSpec>,
}

impl MultiplexConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Append a producer entry
    pub fn producer(mut self, label: impl Into<String>, mode: ProducerMode) -> Self {
        self.producers.push(ProducerSpec::new(label, mode));
        self
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = MultiplexConfig::from_ron("(producers: [(label: \"only\")])").unwrap();
        assert_eq!(config.producers[0], ProducerSpec::new("only", ProducerMode::Dispatch));

        let config = MultiplexConfig::from_ron("()").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_event_loop_without_count() {
        let config =
            MultiplexConfig::from_ron("(producers: [(label: \"x\", mode: EventLoop())])").unwrap();
        assert_eq!(config.producers[0].mode, ProducerMode::EventLoop { count: None });
    }

    #[test]
    fn test_invalid_ron() {
        let err = MultiplexConfig::from_ron("(producers: [(mode: Dispatch)])").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_ron_round_trip() {
        let config = MultiplexConfig::default()
            .producer("a", ProducerMode::Dispatch)
            .producer("b", ProducerMode::EventLoop { count: Some(2) });
        let text = config.to_ron().unwrap();
        assert_eq!(MultiplexConfig::from_ron(&text).unwrap(), config);
    }
}
