//! Third-party license catalog bundled with the preferences tooling.
//!
//! The catalog reads a JSON manifest describing each dependency and narrows
//! every declared license expression to the identifiers whose text actually
//! ships in the license directory. Everything is recomputed on each call;
//! nothing is cached.

mod catalog;
mod manifest;

pub use catalog::{LICENSES_TARGET, LicenseCatalog, LicenseError};
pub use manifest::{AUTHOR_SEPARATOR, DependencyLicenseInfo, LICENSE_ALTERNATIVE};
