use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Well-known path of the daemon's control socket.
pub const DEFAULT_DAEMON_SOCKET: &str = "/tmp/me.aspenuwu.xenon.sock";

/// Bound applied independently to the request write and the response read.
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 1500;

/// Location of the persisted mount table.
pub const DEFAULT_MOUNTS_PATH: &str = "/var/mobile/Library/me.aspenuwu.xenon/mounts.json";

/// Location of the bundled third-party dependency manifest.
pub const DEFAULT_LICENSE_MANIFEST: &str =
    "/Library/PreferenceBundles/XenonPrefs.bundle/LicenseInfo.json";

/// Directory holding one `<identifier>.txt` file per bundled license text.
pub const DEFAULT_LICENSE_DIR: &str = "/Library/PreferenceBundles/XenonPrefs.bundle/Licenses";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default daemon socket path.
pub fn default_daemon_socket() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DAEMON_SOCKET)
}

/// Default mount table path.
pub fn default_mounts_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_MOUNTS_PATH)
}

/// Default license manifest path.
pub fn default_license_manifest() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_LICENSE_MANIFEST)
}

/// Default license text directory.
pub fn default_license_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_LICENSE_DIR)
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
