//! Behaviour-driven tests for editing the mount table.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::str::FromStr;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use xenon_ipc::{DaemonClient, Transport, TransportError};

use crate::{EditError, EditOutcome, MountDescriptor, MountEditor, MountStore, PresetKind};

// ---------------------------------------------------------------------------
// Typed wrappers for Gherkin step parameters
// ---------------------------------------------------------------------------

/// A quoted string value from a Gherkin feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuotedString(String);

impl FromStr for QuotedString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_matches('"').to_owned()))
    }
}

impl QuotedString {
    fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Records every payload and answers `ok`, or refuses when unreachable.
struct RecordingTransport {
    reachable: bool,
    requests: RefCell<Vec<String>>,
}

impl Transport for RecordingTransport {
    fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let text = String::from_utf8_lossy(payload.strip_suffix(b"\0").unwrap_or(payload));
        self.requests.borrow_mut().push(text.into_owned());
        if self.reachable {
            Ok(b"ok".to_vec())
        } else {
            Err(TransportError::Connect {
                path: Utf8PathBuf::from("/tmp/me.aspenuwu.xenon.sock"),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    dir: Option<TempDir>,
    store: Option<MountStore>,
    client: Option<DaemonClient<RecordingTransport>>,
    result: Option<Result<EditOutcome, EditError>>,
}

impl TestWorld {
    fn store(&self) -> &MountStore {
        self.store.as_ref().expect("store should be set")
    }

    fn client(&self) -> &DaemonClient<RecordingTransport> {
        self.client.as_ref().expect("daemon should be set")
    }

    fn outcome(&self) -> &Result<EditOutcome, EditError> {
        self.result.as_ref().expect("an edit should have run")
    }

    fn edit<F>(&mut self, action: F)
    where
        F: FnOnce(&MountEditor<'_, RecordingTransport>) -> Result<EditOutcome, EditError>,
    {
        let editor = MountEditor::new(self.store(), self.client());
        let result = action(&editor);
        self.result = Some(result);
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

fn daemon(reachable: bool) -> DaemonClient<RecordingTransport> {
    DaemonClient::new(RecordingTransport {
        reachable,
        requests: RefCell::new(Vec::new()),
    })
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an empty mount store")]
fn given_empty_store(world: &mut TestWorld) {
    let dir = TempDir::new().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("mounts.json")).expect("utf8 path");
    world.store = Some(MountStore::new(path));
    world.dir = Some(dir);
}

#[given("a mount store containing invalid JSON")]
fn given_corrupt_store(world: &mut TestWorld) {
    given_empty_store(world);
    fs::write(world.store().path().as_std_path(), b"{\"docs\": {\"preset\"")
        .expect("write corrupt file");
}

#[given("a reachable daemon")]
fn given_reachable_daemon(world: &mut TestWorld) {
    world.client = Some(daemon(true));
}

#[given("an unreachable daemon")]
fn given_unreachable_daemon(world: &mut TestWorld) {
    world.client = Some(daemon(false));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("mount {name} is added as preset {preset}")]
fn when_add_preset(world: &mut TestWorld, name: QuotedString, preset: QuotedString) {
    let kind = PresetKind::from_str(preset.as_str()).expect("known preset");
    world.edit(|editor| editor.upsert(name.as_str(), MountDescriptor::Preset(kind)));
}

#[when("mount {name} is added as path {path}")]
fn when_add_path(world: &mut TestWorld, name: QuotedString, path: QuotedString) {
    let descriptor = MountDescriptor::Path(path.as_str().to_owned());
    world.edit(|editor| editor.upsert(name.as_str(), descriptor));
}

#[when("mount {name} is removed")]
fn when_remove(world: &mut TestWorld, name: QuotedString) {
    world.edit(|editor| editor.remove(name.as_str()));
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the edit is synced")]
fn then_synced(world: &mut TestWorld) {
    assert!(matches!(world.outcome(), Ok(EditOutcome::Synced)));
}

#[then("the edit is unchanged")]
fn then_unchanged(world: &mut TestWorld) {
    assert!(matches!(world.outcome(), Ok(EditOutcome::Unchanged)));
}

#[then("the daemon is out of sync")]
fn then_out_of_sync(world: &mut TestWorld) {
    assert!(matches!(
        world.outcome(),
        Ok(EditOutcome::DaemonOutOfSync { .. })
    ));
}

#[then("the edit is rejected as an invalid name")]
fn then_invalid_name(world: &mut TestWorld) {
    assert!(matches!(world.outcome(), Err(EditError::InvalidName(_))));
}

#[then("the store holds mount {name} as {rendering}")]
fn then_store_holds(world: &mut TestWorld, name: QuotedString, rendering: QuotedString) {
    let table = world.store().load();
    let descriptor = table.get(name.as_str()).expect("mount should be stored");
    assert_eq!(descriptor.to_string(), rendering.as_str());
}

#[then("the store holds no mounts")]
fn then_store_empty(world: &mut TestWorld) {
    assert!(world.store().load().is_empty());
}

#[then("no mount file exists")]
fn then_no_file(world: &mut TestWorld) {
    assert!(!world.store().path().as_std_path().exists());
}

#[then("the daemon received {command}")]
fn then_daemon_received(world: &mut TestWorld, command: QuotedString) {
    let requests = world.client().transport().requests.borrow();
    assert_eq!(*requests, vec![command.as_str().to_owned()]);
}

#[then("the daemon received nothing")]
fn then_daemon_received_nothing(world: &mut TestWorld) {
    assert!(world.client().transport().requests.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/mount_store.feature")]
fn mount_store_behaviour(world: TestWorld) {
    let _ = world;
}
