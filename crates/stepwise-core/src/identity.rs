//! Identity types for actor contexts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier minted for an actor context by its configuration
///
/// Ids are only unique within the configuration that minted them; equality
/// of addresses is by identity, not by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u64);

impl ContextId {
    /// Create a new context ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx:{}", self.0)
    }
}
