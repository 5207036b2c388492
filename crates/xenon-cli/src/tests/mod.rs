//! In-process tests for the `xenonctl` runtime.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use xenon_config::Config;
use xenon_ipc::test_support::{FakeDaemon, Reply};

use super::*;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

impl Outcome {
    fn assert_success(&self) {
        assert_eq!(self.exit, ExitCode::SUCCESS, "stderr: {}", self.stderr);
    }

    fn assert_failure(&self) {
        assert_eq!(self.exit, ExitCode::FAILURE, "stdout: {}", self.stdout);
    }
}

struct Harness {
    dir: TempDir,
    config: Config,
}

impl Harness {
    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf8 temp path")
    }

    fn with_daemon(&mut self, daemon: &FakeDaemon) {
        self.config.daemon_socket = daemon.path().to_owned();
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let argv = std::iter::once("xenonctl")
            .chain(args.iter().copied())
            .map(OsString::from);
        let loader = StaticConfigLoader {
            config: self.config.clone(),
        };
        let exit = run_with_loader(argv, &mut stdout, &mut stderr, &loader);
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("stdout utf8"),
            stderr: String::from_utf8(stderr).expect("stderr utf8"),
        }
    }

    fn mounts_file(&self) -> Option<String> {
        fs::read_to_string(self.config.mounts_path().as_std_path()).ok()
    }
}

#[fixture]
fn harness() -> Harness {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
    let config = Config {
        daemon_socket: root.join("absent.sock"),
        read_timeout_ms: 500,
        write_timeout_ms: 500,
        mounts_path: root.join("prefs").join("mounts.json"),
        license_manifest: root.join("LicenseInfo.json"),
        license_dir: root.join("Licenses"),
        log_filter: String::from("off"),
        ..Config::default()
    };
    Harness { dir, config }
}

fn spawn(reply: Reply) -> FakeDaemon {
    FakeDaemon::spawn(reply).expect("spawn fake daemon")
}

#[rstest]
fn help_is_printed_to_stdout(harness: Harness) {
    let outcome = harness.run(&["--help"]);

    outcome.assert_success();
    assert!(outcome.stdout.contains("mounts"));
}

#[rstest]
fn bare_invocation_fails_with_usage(harness: Harness) {
    let outcome = harness.run(&[]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("Usage"));
}

#[rstest]
fn zero_timeout_is_rejected(mut harness: Harness) {
    harness.config.read_timeout_ms = 0;

    let outcome = harness.run(&["reload"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("read_timeout_ms must be greater than zero"));
}

#[rstest]
fn adding_a_mount_saves_and_reloads(mut harness: Harness) {
    let daemon = spawn(Reply::text("ok"));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["mounts", "add", "docs", "--preset", "documents"]);

    outcome.assert_success();
    assert_eq!(outcome.stdout, "mount docs saved\n");
    let session = daemon.finish().expect("daemon session");
    assert_eq!(session.request_text().as_deref(), Some("reload-mounts"));
    let saved: serde_json::Value =
        serde_json::from_str(&harness.mounts_file().expect("mount file written"))
            .expect("valid json");
    assert_eq!(saved, serde_json::json!({"docs": {"preset": "documents"}}));
}

#[rstest]
fn adding_a_mount_without_daemon_warns_but_succeeds(harness: Harness) {
    let outcome = harness.run(&["mounts", "add", "media", "--path", "/var/mobile/Media"]);

    outcome.assert_success();
    assert_eq!(outcome.stdout, "mount media saved\n");
    assert!(outcome.stderr.contains("warning: the daemon was not reloaded"));
    assert!(harness.mounts_file().is_some());
}

#[rstest]
#[case::reserved("XENON", "reserved")]
#[case::bad_character("my docs", "contains ' '")]
fn refused_names_fail_without_writing(
    harness: Harness,
    #[case] name: &str,
    #[case] message: &str,
) {
    let outcome = harness.run(&["mounts", "add", name, "--preset", "home"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains(message), "stderr: {}", outcome.stderr);
    assert!(harness.mounts_file().is_none());
}

#[rstest]
fn listing_prints_mounts_in_name_order(harness: Harness) {
    fs::create_dir_all(harness.root().join("prefs").as_std_path()).expect("prefs dir");
    fs::write(
        harness.config.mounts_path().as_std_path(),
        r#"{"zeta": {"bundle": "com.example.zeta"}, "alpha": {"path": "/var/mobile"}}"#,
    )
    .expect("seed mounts");

    let outcome = harness.run(&["mounts", "list"]);

    outcome.assert_success();
    assert_eq!(
        outcome.stdout,
        "alpha\tpath /var/mobile\nzeta\tapp bundle com.example.zeta\n"
    );
}

#[rstest]
fn removing_an_unknown_mount_changes_nothing(harness: Harness) {
    let outcome = harness.run(&["mounts", "remove", "ghost"]);

    outcome.assert_success();
    assert!(outcome.stderr.contains("no mount named ghost"));
    assert!(harness.mounts_file().is_none());
}

#[rstest]
fn bundles_are_printed_sorted(mut harness: Harness) {
    let daemon = spawn(Reply::text(r#"["com.b", "com.a"]"#));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["bundles"]);

    outcome.assert_success();
    assert_eq!(outcome.stdout, "com.a\ncom.b\n");
    let session = daemon.finish().expect("daemon session");
    assert_eq!(session.request_text().as_deref(), Some("bundles"));
}

#[rstest]
fn empty_public_key_is_a_failure(mut harness: Harness) {
    let daemon = spawn(Reply::text(""));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["pubkey"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("the daemon returned no public key"));
}

#[rstest]
fn generated_config_carries_the_section_header(mut harness: Harness) {
    let daemon = spawn(Reply::text("PublicKey = abc\n"));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["generate-config"]);

    outcome.assert_success();
    assert_eq!(outcome.stdout, "[connection]\nPublicKey = abc\n");
}

#[rstest]
fn foreign_pairing_code_is_refused_locally(harness: Harness) {
    let outcome = harness.run(&["pair", "https://example.com"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("invalid pairing code"));
    assert!(!outcome.stderr.contains("daemon unavailable"));
}

#[rstest]
fn pairing_code_is_forwarded(mut harness: Harness) {
    let daemon = spawn(Reply::text("ok"));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["pair", "XE42~abcdef"]);

    outcome.assert_success();
    let session = daemon.finish().expect("daemon session");
    assert_eq!(session.request_text().as_deref(), Some("XE42~abcdef"));
}

#[rstest]
fn unreachable_daemon_prints_a_hint(harness: Harness) {
    let outcome = harness.run(&["reload"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("daemon unavailable"));
    assert!(outcome.stderr.contains("hint: the Xenon daemon does not appear to be running"));
}

#[rstest]
fn silent_daemon_times_out(mut harness: Harness) {
    let daemon = spawn(Reply::silent(Duration::from_secs(2)));
    harness.with_daemon(&daemon);

    let outcome = harness.run(&["pubkey"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("daemon unavailable"));
    assert!(!outcome.stderr.contains("hint:"));
}

fn seed_licenses(harness: &Harness) {
    let root = harness.root();
    fs::create_dir_all(root.join("Licenses").as_std_path()).expect("license dir");
    fs::write(root.join("Licenses").join("MIT.txt").as_std_path(), "MIT License text")
        .expect("license text");
    fs::write(
        harness.config.license_manifest().as_std_path(),
        r#"[
            {"name": "aead", "version": "0.3.2", "authors": "RustCrypto Developers", "license": "MIT OR Apache-2.0"},
            {"name": "adler32", "version": "1.2.0", "authors": "Remi Rampin", "license": "Zlib"},
            {"name": "adler", "version": "0.2.3", "authors": "Jonas|Remi", "license": "0BSD OR MIT"}
        ]"#,
    )
    .expect("manifest");
}

#[rstest]
fn licenses_lists_dependencies_with_texts(harness: Harness) {
    seed_licenses(&harness);

    let outcome = harness.run(&["licenses"]);

    outcome.assert_success();
    assert_eq!(
        outcome.stdout,
        "adler 0.2.3: MIT\n  by Jonas, Remi\naead 0.3.2: MIT\n  by RustCrypto Developers\n"
    );
}

#[rstest]
fn license_text_is_printed(harness: Harness) {
    seed_licenses(&harness);

    let outcome = harness.run(&["licenses", "--text", "MIT"]);

    outcome.assert_success();
    assert_eq!(outcome.stdout, "MIT License text\n");
}

#[rstest]
fn unknown_license_text_fails(harness: Harness) {
    seed_licenses(&harness);

    let outcome = harness.run(&["licenses", "--text", "Zlib"]);

    outcome.assert_failure();
    assert!(outcome.stderr.contains("no bundled license text for 'Zlib'"));
}
