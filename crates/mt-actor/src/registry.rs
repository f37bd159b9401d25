//! Capability registry.

use std::collections::BTreeMap;

use crate::{Address, Capability};

/// Read-only lookup handed to actors through their context.
pub trait Registry {
    /// Every address registered with `capability`, in ascending order.
    fn lookup(&self, capability: Capability) -> Vec<Address>;

    /// `true` if `address` is currently registered under any capability.
    fn is_registered(&self, address: Address) -> bool;
}

/// In-memory registry owned by the event loop.
///
/// Each address holds at most one capability.  Registering again replaces
/// it.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    entries: BTreeMap<Address, Capability>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `address` was not registered before.
    pub fn register(&mut self, address: Address, capability: Capability) -> bool {
        self.entries.insert(address, capability).is_none()
    }

    pub fn deregister(&mut self, address: Address) -> bool {
        self.entries.remove(&address).is_some()
    }

    pub fn capability_of(&self, address: Address) -> Option<Capability> {
        self.entries.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Registry for Directory {
    fn lookup(&self, capability: Capability) -> Vec<Address> {
        self.entries
            .iter()
            .filter(|&(_, &c)| c == capability)
            .map(|(&a, _)| a)
            .collect()
    }

    fn is_registered(&self, address: Address) -> bool {
        self.entries.contains_key(&address)
    }
}
