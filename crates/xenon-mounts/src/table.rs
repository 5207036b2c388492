//! The in-memory mount table.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::descriptor::MountDescriptor;
use crate::name::MountName;

/// Name-ordered mapping from mount name to descriptor.
///
/// Inserting requires a validated [`MountName`]. Entries read from disk are
/// kept as found, so a hand-edited file with an unusual name still loads and
/// the entry can still be removed by its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountTable {
    entries: BTreeMap<String, MountDescriptor>,
}

impl MountTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous descriptor.
    pub fn insert(
        &mut self,
        name: &MountName,
        descriptor: MountDescriptor,
    ) -> Option<MountDescriptor> {
        self.entries.insert(name.as_str().to_owned(), descriptor)
    }

    /// Removes an entry by name.
    pub fn remove(&mut self, name: &str) -> Option<MountDescriptor> {
        self.entries.remove(name)
    }

    /// Descriptor stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MountDescriptor> {
        self.entries.get(name)
    }

    /// Whether an entry exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, MountDescriptor> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MountTable {
    type Item = (&'a String, &'a MountDescriptor);
    type IntoIter = btree_map::Iter<'a, String, MountDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(MountName, MountDescriptor)> for MountTable {
    fn from_iter<I: IntoIterator<Item = (MountName, MountDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, descriptor)| (name.into_inner(), descriptor))
                .collect(),
        }
    }
}
