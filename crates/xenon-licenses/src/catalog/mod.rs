//! Reading the manifest and checking the license directory.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use thiserror::Error;
use tracing::{debug, warn};
use xenon_config::Config;

use crate::manifest::{DependencyLicenseInfo, ManifestEntry};

/// Tracing target for catalog events.
pub const LICENSES_TARGET: &str = "xenon_licenses::catalog";

const TEXT_EXTENSION: &str = "txt";

/// Reasons the manifest could not be read.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The manifest file could not be read.
    #[error("failed to read license manifest {path}: {source}")]
    ReadManifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The manifest is not a JSON array of dependency entries.
    #[error("failed to decode license manifest {path}: {source}")]
    DecodeManifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Manifest plus the directory of `<identifier>.txt` license texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCatalog {
    manifest: Utf8PathBuf,
    license_dir: Utf8PathBuf,
}

impl LicenseCatalog {
    /// Catalog over `manifest` with texts under `license_dir`.
    #[must_use]
    pub fn new(manifest: impl Into<Utf8PathBuf>, license_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            license_dir: license_dir.into(),
        }
    }

    /// Catalog at the configured locations.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.license_manifest(), config.license_dir())
    }

    /// Manifest path.
    #[must_use]
    pub fn manifest(&self) -> &Utf8Path {
        &self.manifest
    }

    /// License text directory.
    #[must_use]
    pub fn license_dir(&self) -> &Utf8Path {
        &self.license_dir
    }

    /// Dependencies sorted by name; empty when the manifest is unusable.
    #[must_use]
    pub fn list(&self) -> Vec<DependencyLicenseInfo> {
        self.try_list().unwrap_or_else(|error| {
            warn!(target: LICENSES_TARGET, %error, "license catalog unavailable");
            Vec::new()
        })
    }

    /// Dependencies sorted by name.
    ///
    /// A missing or unreadable license directory is not an error; every
    /// identifier is then dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`LicenseError`] when the manifest cannot be read or decoded.
    pub fn try_list(&self) -> Result<Vec<DependencyLicenseInfo>, LicenseError> {
        let contents = std::fs::read(self.manifest.as_std_path()).map_err(|source| {
            LicenseError::ReadManifest {
                path: self.manifest.clone(),
                source,
            }
        })?;
        let entries: Vec<ManifestEntry> =
            serde_json::from_slice(&contents).map_err(|source| LicenseError::DecodeManifest {
                path: self.manifest.clone(),
                source,
            })?;

        let texts = self.open_license_dir();
        let mut dependencies: Vec<DependencyLicenseInfo> = entries
            .into_iter()
            .map(|entry| entry.resolve(|id| has_text(texts.as_ref(), id)))
            .collect();
        dependencies.sort_by(|left, right| left.name.cmp(&right.name));
        debug!(
            target: LICENSES_TARGET,
            dependencies = dependencies.len(),
            "license catalog loaded"
        );
        Ok(dependencies)
    }

    /// Text of license `id`, or `None` when no text is bundled for it.
    ///
    /// Identifiers are resolved inside the license directory only; an
    /// identifier naming a path outside it yields `None`.
    #[must_use]
    pub fn license_text(&self, id: &str) -> Option<String> {
        let dir = self.open_license_dir()?;
        let file = text_file_name(id)?;
        match dir.read_to_string(&file) {
            Ok(text) => Some(text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                debug!(target: LICENSES_TARGET, license = id, %error, "license text unreadable");
                None
            }
        }
    }

    fn open_license_dir(&self) -> Option<Dir> {
        match Dir::open_ambient_dir(self.license_dir.as_std_path(), ambient_authority()) {
            Ok(dir) => Some(dir),
            Err(error) => {
                warn!(
                    target: LICENSES_TARGET,
                    dir = %self.license_dir,
                    %error,
                    "license directory unavailable"
                );
                None
            }
        }
    }
}

fn text_file_name(id: &str) -> Option<String> {
    if id.is_empty() {
        return None;
    }
    Some(format!("{id}.{TEXT_EXTENSION}"))
}

fn has_text(dir: Option<&Dir>, id: &str) -> bool {
    let (Some(dir), Some(file)) = (dir, text_file_name(id)) else {
        return false;
    };
    dir.is_file(file)
}
