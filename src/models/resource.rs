//! Machine registry.
//!
//! The registry is the authoritative list of machines segments may be
//! placed on. A step naming a machine that is not registered makes its
//! whole job unplaceable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of valid machine identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRegistry {
    machines: BTreeSet<String>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a machine.
    pub fn with_machine(mut self, id: impl Into<String>) -> Self {
        self.machines.insert(id.into());
        self
    }

    /// Registers a machine. Returns `false` if it was already known.
    pub fn register(&mut self, id: impl Into<String>) -> bool {
        self.machines.insert(id.into())
    }

    /// Whether a machine is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.machines.contains(id)
    }

    /// Machine identifiers in sorted order.
    pub fn machines(&self) -> impl Iterator<Item = &str> {
        self.machines.iter().map(String::as_str)
    }

    /// Number of machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether no machine is registered.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            machines: iter.into_iter().map(Into::into).collect(),
        }
    }
}
