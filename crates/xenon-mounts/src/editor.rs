//! Mutate-then-notify editing of the mount table.
//!
//! An edit is persisted before the daemon hears about it. The file is the
//! authority: if the reload request fails the edit stands and the caller is
//! told the daemon is out of sync, so it can ask the user to reload later.

use thiserror::Error;
use tracing::warn;
use xenon_ipc::{ClientError, DaemonClient, Transport};

use crate::descriptor::MountDescriptor;
use crate::name::{MountName, MountNameError};
use crate::store::{MountStore, STORE_TARGET, StoreError};

/// Reasons an edit was not applied. The file is unchanged in every case.
#[derive(Debug, Error)]
pub enum EditError {
    /// The proposed name was refused before anything was touched.
    #[error(transparent)]
    InvalidName(#[from] MountNameError),
    /// The updated table could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened after an edit was applied (or found unnecessary).
#[derive(Debug)]
pub enum EditOutcome {
    /// The edit was persisted and the daemon acknowledged a reload.
    Synced,
    /// Nothing needed to change; neither the file nor the daemon was touched.
    Unchanged,
    /// The edit was persisted but the daemon could not be told to reload.
    DaemonOutOfSync {
        /// Why the reload request failed.
        reason: ClientError,
    },
}

impl EditOutcome {
    /// Whether the daemon is known to reflect the file.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        !matches!(self, Self::DaemonOutOfSync { .. })
    }
}

/// Applies edits to a [`MountStore`] and notifies the daemon through a
/// [`DaemonClient`].
#[derive(Debug)]
pub struct MountEditor<'a, T> {
    store: &'a MountStore,
    client: &'a DaemonClient<T>,
}

impl<'a, T: Transport> MountEditor<'a, T> {
    /// Editor over `store` that notifies via `client`.
    pub const fn new(store: &'a MountStore, client: &'a DaemonClient<T>) -> Self {
        Self { store, client }
    }

    /// Validates `name`, stores `descriptor` under it and asks the daemon to
    /// reload.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidName`] before any I/O when `name` is
    /// refused, and [`EditError::Store`] when the table cannot be saved. In
    /// both cases the daemon is not contacted.
    pub fn upsert(&self, name: &str, descriptor: MountDescriptor) -> Result<EditOutcome, EditError> {
        let name: MountName = name.parse()?;
        self.store.upsert(&name, descriptor)?;
        Ok(self.notify())
    }

    /// Removes `name` and asks the daemon to reload. An absent name is
    /// [`EditOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Store`] when the table cannot be saved; the
    /// daemon is then not contacted.
    pub fn remove(&self, name: &str) -> Result<EditOutcome, EditError> {
        if self.store.remove(name)?.is_none() {
            return Ok(EditOutcome::Unchanged);
        }
        Ok(self.notify())
    }

    fn notify(&self) -> EditOutcome {
        match self.client.reload_mounts() {
            Ok(()) => EditOutcome::Synced,
            Err(reason) => {
                warn!(
                    target: STORE_TARGET,
                    error = %reason,
                    "mount table saved but the daemon was not reloaded"
                );
                EditOutcome::DaemonOutOfSync { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use xenon_ipc::TransportError;

    use super::*;
    use crate::descriptor::PresetKind;

    #[derive(Default)]
    struct CountingTransport {
        reachable: bool,
        calls: RefCell<Vec<Vec<u8>>>,
    }

    impl Transport for CountingTransport {
        fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
            self.calls.borrow_mut().push(payload.to_vec());
            if self.reachable {
                Ok(b"ok".to_vec())
            } else {
                Err(TransportError::Connect {
                    path: Utf8PathBuf::from("/tmp/absent.sock"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }
    }

    struct Harness {
        _dir: TempDir,
        store: MountStore,
    }

    #[fixture]
    fn harness() -> Harness {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("mounts.json"))
            .expect("utf8 temp path");
        Harness {
            _dir: dir,
            store: MountStore::new(path),
        }
    }

    fn client(reachable: bool) -> DaemonClient<CountingTransport> {
        DaemonClient::new(CountingTransport {
            reachable,
            ..CountingTransport::default()
        })
    }

    #[rstest]
    fn upsert_persists_then_reloads(harness: Harness) {
        let client = client(true);
        let editor = MountEditor::new(&harness.store, &client);

        let outcome = editor
            .upsert("docs", MountDescriptor::Preset(PresetKind::Documents))
            .expect("edit applies");

        assert!(matches!(outcome, EditOutcome::Synced));
        assert_eq!(
            harness.store.load().get("docs"),
            Some(&MountDescriptor::Preset(PresetKind::Documents))
        );
        assert_eq!(
            *client.transport().calls.borrow(),
            vec![b"reload-mounts\0".to_vec()]
        );
    }

    #[rstest]
    fn unreachable_daemon_keeps_the_edit(harness: Harness) {
        let client = client(false);
        let editor = MountEditor::new(&harness.store, &client);

        let outcome = editor
            .upsert("media", MountDescriptor::Path(String::from("/var/mobile/Media")))
            .expect("edit applies");

        assert!(!outcome.is_synced());
        assert!(matches!(
            outcome,
            EditOutcome::DaemonOutOfSync {
                reason: ClientError::DaemonUnavailable(TransportError::Connect { .. })
            }
        ));
        assert!(harness.store.load().contains("media"));
    }

    #[rstest]
    #[case::reserved("Xenon")]
    #[case::empty("")]
    #[case::space("my docs")]
    #[case::slash("a/b")]
    fn refused_name_touches_nothing(harness: Harness, #[case] name: &str) {
        let client = client(true);
        let editor = MountEditor::new(&harness.store, &client);

        let error = editor
            .upsert(name, MountDescriptor::Preset(PresetKind::Home))
            .expect_err("name must be refused");

        assert!(matches!(error, EditError::InvalidName(_)));
        assert!(!harness.store.path().as_std_path().exists());
        assert!(client.transport().calls.borrow().is_empty());
    }

    #[rstest]
    fn removing_absent_name_is_unchanged(harness: Harness) {
        let client = client(true);
        let editor = MountEditor::new(&harness.store, &client);

        let outcome = editor.remove("ghost").expect("remove succeeds");

        assert!(matches!(outcome, EditOutcome::Unchanged));
        assert!(outcome.is_synced());
        assert!(client.transport().calls.borrow().is_empty());
    }

    #[rstest]
    fn remove_persists_then_reloads(harness: Harness) {
        let client = client(true);
        let editor = MountEditor::new(&harness.store, &client);
        editor
            .upsert("docs", MountDescriptor::Preset(PresetKind::Documents))
            .expect("seed");

        let outcome = editor.remove("docs").expect("remove succeeds");

        assert!(matches!(outcome, EditOutcome::Synced));
        assert!(harness.store.load().is_empty());
        assert_eq!(client.transport().calls.borrow().len(), 2);
    }

    #[rstest]
    fn failed_save_skips_the_daemon(harness: Harness) {
        std::fs::write(harness.store.path().as_std_path(), b"{}").expect("seed file");
        let blocked = MountStore::new(harness.store.path().join("nested.json"));
        let client = client(true);
        let editor = MountEditor::new(&blocked, &client);

        let error = editor
            .upsert("docs", MountDescriptor::Preset(PresetKind::Home))
            .expect_err("save must fail");

        assert!(matches!(error, EditError::Store(StoreError::Write { .. })));
        assert!(client.transport().calls.borrow().is_empty());
    }
}
