//! Named flag groups that several commands inherit.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::flags::FlagGroup;

/// Registry of shared parent fragments, keyed by name.
///
/// A name can be created exactly once. Commands inherit a snapshot of the
/// group at the time they are registered.
#[derive(Debug, Default)]
pub struct SharedParsers {
    groups: HashMap<String, FlagGroup>,
}

impl SharedParsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty group called `name`. Returns `None` if the name is
    /// already taken, leaving the existing group untouched.
    pub fn create(&mut self, name: &str) -> Option<&mut FlagGroup> {
        match self.groups.entry(name.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => Some(entry.insert(FlagGroup::new())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FlagGroup> {
        self.groups.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
