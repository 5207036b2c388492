//! Persisted mount configuration for the Xenon daemon.
//!
//! The mount table maps user-chosen names to [`MountDescriptor`]s and lives
//! in a JSON file that the daemon re-reads on `reload-mounts`. It is the only
//! record of what the daemon should expose; the daemon keeps no copy of its
//! own beyond what it last loaded.
//!
//! Reading is best effort ([`MountStore::load`] yields an empty table for a
//! missing or corrupt file) and writing is authoritative ([`MountStore::save`]
//! replaces the file atomically or not at all). [`MountEditor`] layers the
//! mutate-then-notify sequence on top: the edit is persisted first and the
//! daemon is told to reload afterwards, on a best-effort basis.

mod descriptor;
mod editor;
mod name;
mod store;
mod table;

pub use descriptor::{DescriptorError, MountDescriptor, PresetKind};
pub use editor::{EditError, EditOutcome, MountEditor};
pub use name::{MountName, MountNameError, RESERVED_NAME};
pub use store::{LoadError, MountStore, STORE_TARGET, StoreError};
pub use table::MountTable;

#[cfg(test)]
mod tests;
