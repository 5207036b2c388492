//! `xenonctl licenses`.

use std::io::Write;

use xenon_licenses::LicenseCatalog;

use super::{write_block, write_line};
use crate::AppError;

pub(super) fn execute<W: Write>(
    text: Option<&str>,
    catalog: &LicenseCatalog,
    stdout: &mut W,
) -> Result<(), AppError> {
    if let Some(id) = text {
        let body = catalog
            .license_text(id)
            .ok_or_else(|| AppError::UnknownLicense { id: id.to_owned() })?;
        return write_block(stdout, &body);
    }

    // Dependencies without a bundled text have nothing to show.
    for dependency in catalog.list().iter().filter(|dep| dep.has_licenses()) {
        let licenses: Vec<&str> = dependency
            .licenses
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        write_line(
            stdout,
            format_args!(
                "{} {}: {}",
                dependency.name,
                dependency.version,
                licenses.join(", ")
            ),
        )?;
        write_line(stdout, format_args!("  by {}", dependency.authors_display()))?;
    }
    Ok(())
}
